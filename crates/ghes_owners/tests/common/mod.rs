//! Scripted instance shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ghes_owners::HttpError;
use ghes_owners::HttpTransport;
use ghes_owners::http::{HttpMethod, HttpRequest, HttpResponse};
use serde_json::{Value, json};

pub const HOST: &str = "ghe.example.com";
pub const META_URL: &str = "https://ghe.example.com/api/v3/meta";
pub const GRAPHQL_URL: &str = "https://ghe.example.com/api/graphql";

/// Transport that replays queued responses per method and URL.
#[derive(Clone, Default)]
pub struct ScriptedInstance {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    routes: HashMap<(HttpMethod, String), VecDeque<HttpResponse>>,
    requests: Vec<HttpRequest>,
}

impl ScriptedInstance {
    pub fn respond(&self, method: HttpMethod, url: &str, status: u16, body: Value) {
        self.inner
            .lock()
            .unwrap()
            .routes
            .entry((method, url.to_string()))
            .or_default()
            .push_back(HttpResponse {
                status,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: body.to_string().into_bytes(),
            });
    }

    pub fn meta(&self, version: &str) {
        self.respond(
            HttpMethod::Get,
            META_URL,
            200,
            json!({
                "verifiable_password_authentication": true,
                "installed_version": version
            }),
        );
    }

    pub fn organizations(&self, logins: &[&str]) {
        let nodes: Vec<Value> = logins.iter().map(|l| json!({ "login": l })).collect();
        self.respond(
            HttpMethod::Post,
            GRAPHQL_URL,
            200,
            json!({
                "data": {
                    "organizations": {
                        "nodes": nodes,
                        "pageInfo": { "endCursor": null, "hasNextPage": false }
                    }
                }
            }),
        );
    }

    pub fn owners(&self, owners: &[(&str, &str, &str)]) {
        let nodes: Vec<Value> = owners
            .iter()
            .map(|(login, name, email)| json!({ "login": login, "name": name, "email": email }))
            .collect();
        self.respond(
            HttpMethod::Post,
            GRAPHQL_URL,
            200,
            json!({
                "data": {
                    "enterprise": {
                        "members": {
                            "nodes": nodes,
                            "pageInfo": { "endCursor": null, "hasNextPage": false }
                        }
                    }
                }
            }),
        );
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedInstance {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut script = self.inner.lock().unwrap();
        let key = (request.method, request.url.clone());
        script.requests.push(request);
        script
            .routes
            .get_mut(&key)
            .and_then(|q| q.pop_front())
            .ok_or(HttpError::Unscripted {
                method: key.0,
                url: key.1,
            })
    }
}
