use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::CommandSink;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Posts commands as plain-text bodies to the display backend.
///
/// Requests run on a worker thread so the UI never waits on the network.
pub struct HttpEmitter {
    url: String,
    tx: Sender<String>,
    _worker: JoinHandle<()>,
}

impl HttpEmitter {
    pub fn new(url: &str) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<String>();
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        let target = url.to_string();

        let worker = thread::Builder::new()
            .name("command-emitter".to_string())
            .spawn(move || {
                // Ends when the sender is dropped
                for command in rx {
                    let result = agent
                        .post(&target)
                        .set("Content-Type", "text/plain")
                        .send_string(&command);
                    match result {
                        Ok(_) => log::debug!("sent: {}", command),
                        Err(e) => log::debug!("dropped command {:?}: {}", command, e),
                    }
                }
            })?;

        Ok(Self {
            url: url.to_string(),
            tx,
            _worker: worker,
        })
    }
}

impl CommandSink for HttpEmitter {
    fn emit(&self, command: &str) {
        log::debug!("command: {}", command);
        if self.tx.send(command.to_string()).is_err() {
            log::debug!("emitter worker gone, dropped {:?}", command);
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
