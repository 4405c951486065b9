//! Plain-text transcript rendering

use spaceroom_core::{Avatar, Presence, TranscriptConfig, TranscriptLine};

fn avatar_label(avatar: &Avatar) -> String {
    match avatar {
        Avatar::Image(_) => "[img]".to_string(),
        Avatar::Initial(c) | Avatar::Glyph(c) => format!("[{}]", c),
    }
}

fn presence_marker(presence: Presence) -> &'static str {
    match presence {
        Presence::Online => " *",
        Presence::Away => " ~",
        Presence::Offline => "",
    }
}

fn status(line: &TranscriptLine) -> &'static str {
    if line.is_pending {
        return " (sending)";
    }
    match line.read {
        Some(true) => " (read)",
        Some(false) => " (sent)",
        None => "",
    }
}

/// Render transcript lines, or the empty-state text when there are none
pub fn render(lines: &[TranscriptLine], config: &TranscriptConfig) -> Vec<String> {
    if lines.is_empty() {
        return vec![config.empty_state.clone()];
    }

    let mut out = Vec::with_capacity(lines.len() * 2);
    for line in lines {
        if let Some(label) = &line.sender_label {
            let badge = match line.role {
                Some(role) if role.is_staff() => format!(" ({})", role),
                _ => String::new(),
            };
            out.push(format!(
                "{} {}{}{}",
                avatar_label(&line.avatar),
                label,
                badge,
                presence_marker(line.presence)
            ));
        }
        out.push(format!("    {}  {}{}", line.time, line.body, status(line)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use spaceroom_core::UserRole;

    fn line(label: Option<&str>, body: &str) -> TranscriptLine {
        TranscriptLine {
            key: "c:1".to_string(),
            sender_label: label.map(str::to_string),
            avatar: Avatar::Initial('D'),
            role: Some(UserRole::Instructor),
            presence: Presence::Online,
            body: body.to_string(),
            time: "09:05".to_string(),
            is_own: false,
            is_pending: false,
            read: None,
        }
    }

    #[test]
    fn test_empty_state() {
        let config = TranscriptConfig::default();
        assert_eq!(render(&[], &config), vec![config.empty_state.clone()]);
    }

    #[test]
    fn test_header_then_bodies() {
        let lines = vec![line(Some("Dr. Vega"), "Welcome"), line(None, "Quiz on Friday")];
        let out = render(&lines, &TranscriptConfig::default());
        assert_eq!(
            out,
            vec![
                "[D] Dr. Vega (Instructor) *".to_string(),
                "    09:05  Welcome".to_string(),
                "    09:05  Quiz on Friday".to_string(),
            ]
        );
    }

    #[test]
    fn test_delivery_status() {
        let mut pending = line(None, "typing fast");
        pending.is_pending = true;
        pending.read = Some(false);
        let mut read = line(None, "seen");
        read.read = Some(true);

        let out = render(&[pending, read], &TranscriptConfig::default());
        assert!(out[0].ends_with("(sending)"));
        assert!(out[1].ends_with("(read)"));
    }
}
