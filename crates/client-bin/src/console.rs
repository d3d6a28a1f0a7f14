//! Terminal I/O helpers and the CLI navigator.

use challenge_orchestrator::Navigator;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

/// Print a prompt and read one trimmed line from stdin.
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Navigator that captures the target instead of transitioning screens.
///
/// The command loop takes the captured URL after each submission: challenge
/// URLs are followed by mounting the next controller, anything else is
/// printed as the final destination.
#[derive(Default)]
pub struct CapturedNavigator {
    target: Mutex<Option<String>>,
}

impl CapturedNavigator {
    /// Take the most recent navigation target, if any.
    pub fn take(&self) -> Option<String> {
        self.target.lock().unwrap().take()
    }
}

impl Navigator for CapturedNavigator {
    fn navigate(&self, path: &str) {
        let mut target = self.target.lock().unwrap();
        *target = Some(path.to_string());
    }
}
