//! Interactive stdin commands.
//!
//! | Line | Effect |
//! |---|---|
//! | `call <id>` | mount or switch call |
//! | `leave` | unmount the call |
//! | `join` / `unjoin` | set the `joined` flag |
//! | `request` | ask the host for access |
//! | `user <id>` / `user guest` | change identity |
//! | `status` | log the current session |
//! | `quit` | exit |

use call0_access::{CallId, Command, UserIdentity};
use thiserror::Error;

/// A parsed stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Forward to the runtime.
    Command(Command),
    /// Log the current session.
    Status,
    /// Exit the watcher.
    Quit,
}

/// Unparseable stdin line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// First word is not a known command.
    #[error("unknown command {0:?} (try: call, leave, join, unjoin, request, user, status, quit)")]
    Unknown(String),

    /// Command needs an argument.
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
}

/// Parse one stdin line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Input>, InputError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let input = match verb.to_ascii_lowercase().as_str() {
        "call" => {
            let call_id = arg.and_then(CallId::parse).ok_or(InputError::MissingArgument("call"))?;
            Input::Command(Command::SetCall(Some(call_id)))
        },
        "leave" => Input::Command(Command::SetCall(None)),
        "join" => Input::Command(Command::SetJoined(true)),
        "unjoin" => Input::Command(Command::SetJoined(false)),
        "request" => Input::Command(Command::RequestAccess),
        "user" => {
            let id = arg.ok_or(InputError::MissingArgument("user"))?;
            Input::Command(Command::SetUser(UserIdentity::from_raw(Some(id))))
        },
        "status" => Input::Status,
        "quit" | "exit" => Input::Quit,
        _ => return Err(InputError::Unknown(verb.to_string())),
    };
    Ok(Some(input))
}
