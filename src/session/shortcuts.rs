use crate::session::messages::Msg;
use crate::session::state::{EditorState, Session, Tool};

/// Keys the editor reacts to, as reported by the host toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Delete,
    Backspace,
    Character(char),
}

pub fn handle_key_event(session: &Session, key: Key) -> Option<Msg> {
    // The scale value request is modal: only Escape gets through
    if matches!(session.state(), EditorState::ScalePending { .. }) {
        return match key {
            Key::Escape => Some(Msg::scale_cancel()),
            _ => None,
        };
    }

    let drawing_polygon = session.state().tool().is_some_and(Tool::is_polygon);

    match key {
        Key::Escape => Some(Msg::cancel()),
        Key::Enter if drawing_polygon => Some(Msg::finish()),
        // Deleting is only meaningful when no gesture is in progress
        Key::Delete | Key::Backspace if session.state().tool().is_none() => {
            session.selected().map(|_| Msg::delete_selected())
        }
        Key::Character(c) => match c.to_ascii_lowercase() {
            'r' => Some(Msg::start(Tool::Region)),
            'b' => Some(Msg::start(Tool::Boundary)),
            's' => Some(Msg::start(Tool::Scale)),
            'm' => Some(Msg::start(Tool::Measure)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::handlers::handle_msg;
    use crate::config::AppConfig;
    use crate::domain::EntityId;

    fn session() -> Session {
        Session::new(&AppConfig {
            require_image: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_tool_letters() {
        let session = session();
        assert_eq!(
            handle_key_event(&session, Key::Character('b')),
            Some(Msg::start(Tool::Boundary))
        );
        assert_eq!(
            handle_key_event(&session, Key::Character('M')),
            Some(Msg::start(Tool::Measure))
        );
        assert_eq!(handle_key_event(&session, Key::Character('x')), None);
        assert_eq!(handle_key_event(&session, Key::Enter), None);
    }

    #[test]
    fn test_scale_request_swallows_keys() {
        let mut session = session();
        for msg in [
            Msg::start(Tool::Scale),
            Msg::left_click(0.0, 0.0),
            Msg::left_click(10.0, 0.0),
        ] {
            handle_msg(&mut session, msg);
        }
        assert_eq!(handle_key_event(&session, Key::Character('r')), None);
        assert_eq!(
            handle_key_event(&session, Key::Escape),
            Some(Msg::scale_cancel())
        );
    }

    #[test]
    fn test_enter_finishes_and_delete_needs_selection() {
        let mut session = session();
        handle_msg(&mut session, Msg::start(Tool::Region));
        assert_eq!(handle_key_event(&session, Key::Enter), Some(Msg::finish()));

        for msg in [
            Msg::left_click(0.0, 0.0),
            Msg::left_click(20.0, 0.0),
            Msg::left_click(20.0, 20.0),
            Msg::finish(),
        ] {
            handle_msg(&mut session, msg);
        }
        assert_eq!(handle_key_event(&session, Key::Delete), None);
        handle_msg(&mut session, Msg::select(EntityId::Region(0)));
        assert_eq!(
            handle_key_event(&session, Key::Backspace),
            Some(Msg::delete_selected())
        );
    }
}
