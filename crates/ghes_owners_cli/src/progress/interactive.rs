use std::sync::Mutex;
use std::time::Duration;

use console::style;
use ghes_owners::ReportProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::organization_url;

const TICK: Duration = Duration::from_millis(100);

#[derive(Default)]
struct ProgressState {
    /// Spinner for the version check and organization listing.
    spinner: Option<ProgressBar>,
    /// One step per organization, skipped ones included.
    organizations_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    host: String,
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new(host: &str) -> Self {
        Self::with_multi(host, MultiProgress::new())
    }

    /// Reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden(host: &str) -> Self {
        Self::with_multi(
            host,
            MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()),
        )
    }

    fn with_multi(host: &str, multi: MultiProgress) -> Self {
        Self {
            host: host.to_string(),
            multi,
            state: Mutex::new(ProgressState::default()),
        }
    }

    fn start_spinner(&self, state: &mut ProgressState, prefix: &str, message: String) {
        if let Some(pb) = state.spinner.take()
            && !pb.is_finished()
        {
            pb.finish_and_clear();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.enable_steady_tick(TICK);
        pb.set_prefix(format!("{prefix:12}"));
        pb.set_message(message);
        state.spinner = Some(pb);
    }

    fn println(&self, line: String) {
        self.multi.println(line).ok();
    }

    pub fn handle(&self, event: ReportProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            ReportProgress::CheckingVersion { host, minimum } => {
                self.start_spinner(
                    &mut state,
                    "Version",
                    format!("Checking {host} (need >= {minimum})..."),
                );
            }

            ReportProgress::VersionAccepted { installed, .. } => {
                if let Some(ref pb) = state.spinner {
                    pb.finish_with_message(format!(
                        "{} GitHub Enterprise Server {}",
                        style("✓").green(),
                        installed
                    ));
                }
            }

            ReportProgress::FetchingOrganizations => {
                self.start_spinner(
                    &mut state,
                    "Organizations",
                    "Fetching organizations...".to_string(),
                );
            }

            ReportProgress::FetchedPage {
                scope,
                page,
                total_so_far,
                ..
            } => {
                if state.organizations_bar.is_none() {
                    if let Some(ref pb) = state.spinner {
                        pb.set_message(format!("Page {page} ({total_so_far} organizations)"));
                    }
                } else if let Some(ref pb) = state.organizations_bar {
                    pb.set_message(format!("{scope}: page {page} ({total_so_far} owners)"));
                }
            }

            ReportProgress::OrganizationsListed { total } => {
                if let Some(ref pb) = state.spinner {
                    pb.finish_with_message(format!("✓ {total} organizations"));
                }
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:12}", "Owners"));
                state.organizations_bar = Some(pb);
            }

            ReportProgress::ResolvingOwners { organization, .. } => {
                if let Some(ref pb) = state.organizations_bar {
                    pb.set_message(organization);
                }
            }

            ReportProgress::SkippedOrganization { organization } => {
                self.println(format!(
                    "{}",
                    style(format!("Skipping {organization}")).dim()
                ));
                if let Some(ref pb) = state.organizations_bar {
                    pb.inc(1);
                }
            }

            ReportProgress::OwnersResolved {
                organization,
                owners,
                ..
            } => {
                self.println(format!(
                    "Looking up owners for {} ... found {}",
                    style(organization_url(&self.host, &organization)).cyan(),
                    style(owners).bold()
                ));
                if let Some(ref pb) = state.organizations_bar {
                    pb.inc(1);
                }
            }

            ReportProgress::ReportComplete {
                organizations,
                rows,
                ..
            } => {
                if let Some(ref pb) = state.organizations_bar {
                    pb.finish_with_message(format!(
                        "✓ {rows} rows from {organizations} organizations"
                    ));
                }
            }

            _ => {}
        }
    }

    /// Organizations handled so far, skipped ones included.
    #[cfg(test)]
    pub fn organizations_done(&self) -> u64 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .organizations_bar
            .as_ref()
            .map(ProgressBar::position)
            .unwrap_or_default()
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in [&state.spinner, &state.organizations_bar]
            .into_iter()
            .flatten()
        {
            if !pb.is_finished() {
                pb.abandon();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}
