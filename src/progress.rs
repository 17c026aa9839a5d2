use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

/// The spinner currently on screen, if any. Log output clears it first.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active() -> Option<ProgressBar> {
    ACTIVE.lock().ok().and_then(|bar| bar.clone())
}

fn set_active(bar: Option<ProgressBar>) {
    if let Ok(mut active) = ACTIVE.lock() {
        *active = bar;
    }
}

/// Clears the active spinner slot on drop, including when the future is cancelled.
struct ActiveGuard;

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        set_active(None);
    }
}

/// Stderr writer for the log subscriber. Lines are written with the spinner
/// suspended so the two never share a terminal row.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinnerAwareStderr;

impl Write for SpinnerAwareStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match active() {
            Some(bar) => bar.suspend(|| io::stderr().write_all(buf))?,
            None => io::stderr().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Show a spinner on stderr while `future` runs. Hidden automatically when
/// stderr is not a terminal.
pub async fn with_spinner<F, T>(message: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    set_active(Some(spinner.clone()));
    let _guard = ActiveGuard;
    let output = future.await;
    spinner.finish_and_clear();
    output
}
