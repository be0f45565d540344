mod http_emitter;

pub use http_emitter::HttpEmitter;

/// Destination for command strings.
///
/// Emitting is fire-and-forget: no response is read, nothing is retried and
/// failures never reach the caller.
pub trait CommandSink {
    fn emit(&self, command: &str);

    /// Short description for the status header
    fn describe(&self) -> String;
}

/// Logs commands without sending them
pub struct LogEmitter;

impl CommandSink for LogEmitter {
    fn emit(&self, command: &str) {
        log::info!("command (dry run): {}", command);
    }

    fn describe(&self) -> String {
        "dry run".to_string()
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;

    use super::CommandSink;

    /// Collects emitted commands for assertions
    #[derive(Default)]
    pub struct RecordingSink {
        pub commands: RefCell<Vec<String>>,
    }

    impl RecordingSink {
        pub fn take(&self) -> Vec<String> {
            self.commands.borrow_mut().drain(..).collect()
        }
    }

    impl CommandSink for RecordingSink {
        fn emit(&self, command: &str) {
            self.commands.borrow_mut().push(command.to_string());
        }

        fn describe(&self) -> String {
            "recording".to_string()
        }
    }
}
