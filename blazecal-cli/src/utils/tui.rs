use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown on stderr while waiting on the store.
pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/", " "])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Run `fut` behind a spinner, unless output is JSON.
pub async fn with_spinner<F: std::future::Future>(message: &str, quiet: bool, fut: F) -> F::Output {
    if quiet {
        return fut.await;
    }
    let spinner = create_spinner(message.to_string());
    let output = fut.await;
    spinner.finish_and_clear();
    output
}
