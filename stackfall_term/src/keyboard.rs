use console::{Key, Term};
use stackfall::InputIntents;

/// Intent for a key press, `None` for unbound keys
///
/// The terminal reports presses only, so a soft-drop press counts as the key
/// being held for the tick that receives it.
pub fn intents_for_key(key: &Key) -> Option<InputIntents> {
    match key {
        Key::ArrowLeft => Some(InputIntents::left()),
        Key::ArrowRight => Some(InputIntents::right()),
        Key::ArrowUp => Some(InputIntents::rotate()),
        Key::ArrowDown => Some(InputIntents::soft_drop()),
        Key::Escape | Key::Char('q') | Key::Char('Q') => Some(InputIntents::quit()),
        _ => None,
    }
}

/// Read keys on a blocking thread and forward their intents
///
/// Stops after forwarding a quit intent or once the receiver is gone.
pub fn spawn_key_reader(sender: flume::Sender<InputIntents>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let input_term = Term::stdout();
        loop {
            let key = match input_term.read_key() {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!("Keyboard read failed: {}", e);
                    break;
                }
            };
            let Some(intents) = intents_for_key(&key) else {
                continue;
            };
            if sender.send(intents).is_err() || intents.quit {
                break;
            }
        }
    })
}
