use chrono::{DateTime, Local, TimeZone, Utc};
use survey_types::{ChatMessage, Role};

/// Placeholder row shown on the assistant side while a request is in flight.
pub const TYPING_LABEL: &str = "Typing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Avatar {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleTone {
    /// Highlighted bubble (the user's own turns).
    Accent,
    /// Neutral bubble (assistant turns).
    Muted,
}

/// Display form of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub alignment: Alignment,
    pub avatar: Avatar,
    /// Whether the avatar sits before the bubble rather than after it.
    pub avatar_leading: bool,
    pub tone: BubbleTone,
    pub content: String,
    /// `HH:MM` on a 24-hour clock; absent when the turn has no timestamp.
    pub time: Option<String>,
}

impl MessageView {
    /// View in the local time zone.
    pub fn new(message: &ChatMessage) -> Self {
        Self::new_in(message, &Local)
    }

    pub fn new_in<Tz>(message: &ChatMessage, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let (alignment, avatar, avatar_leading, tone) = match message.role {
            Role::User => (Alignment::End, Avatar::User, false, BubbleTone::Accent),
            Role::Assistant => (Alignment::Start, Avatar::Assistant, true, BubbleTone::Muted),
        };
        Self {
            alignment,
            avatar,
            avatar_leading,
            tone,
            content: message.content.clone(),
            time: message.timestamp.map(|ts| format_time_in(&ts, tz)),
        }
    }

    /// Plain-text rendering, one line per content line.
    pub fn render_text(&self) -> String {
        let who = match self.avatar {
            Avatar::User => "You",
            Avatar::Assistant => "Assistant",
        };
        let time = self.time.as_deref().map(|t| format!(" [{t}]")).unwrap_or_default();
        let indent = match self.alignment {
            Alignment::Start => "",
            Alignment::End => "    ",
        };

        let mut out = format!("{indent}{who}{time}:");
        for line in self.content.lines() {
            out.push('\n');
            out.push_str(indent);
            out.push_str("  ");
            out.push_str(line);
        }
        out
    }
}

/// Assistant-side row shown while a reply is pending.
pub fn typing_placeholder() -> MessageView {
    MessageView {
        alignment: Alignment::Start,
        avatar: Avatar::Assistant,
        avatar_leading: true,
        tone: BubbleTone::Muted,
        content: TYPING_LABEL.to_owned(),
        time: None,
    }
}

/// Label of the submit control.
pub fn submit_label(is_loading: bool) -> &'static str {
    if is_loading { "Sending..." } else { "Send" }
}

/// `HH:MM` in the local time zone.
pub fn format_time(ts: &DateTime<Utc>) -> String {
    format_time_in(ts, &Local)
}

pub fn format_time_in<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format("%H:%M").to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::FixedOffset;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 3, h, m, 5).unwrap()
    }

    #[test]
    fn user_turns_are_end_aligned_and_accented() {
        let view = MessageView::new_in(&ChatMessage::user("hi", at(9, 5)), &Utc);
        assert_eq!(view.alignment, Alignment::End);
        assert_eq!(view.avatar, Avatar::User);
        assert!(!view.avatar_leading);
        assert_eq!(view.tone, BubbleTone::Accent);
        assert_eq!(view.time.as_deref(), Some("09:05"));
    }

    #[test]
    fn assistant_turns_are_start_aligned_and_muted() {
        let view = MessageView::new_in(&ChatMessage::assistant("hello", at(23, 59)), &Utc);
        assert_eq!(view.alignment, Alignment::Start);
        assert_eq!(view.avatar, Avatar::Assistant);
        assert!(view.avatar_leading);
        assert_eq!(view.tone, BubbleTone::Muted);
        assert_eq!(view.time.as_deref(), Some("23:59"));
    }

    #[test]
    fn time_uses_24_hour_clock_in_given_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_time_in(&at(14, 30), &plus_two), "16:30");
        assert_eq!(format_time_in(&at(23, 15), &plus_two), "01:15");
    }

    #[test]
    fn missing_timestamp_shows_no_time() {
        let msg = ChatMessage {
            role: Role::Assistant,
            content: "x".into(),
            timestamp: None,
        };
        let view = MessageView::new(&msg);
        assert!(view.time.is_none());
        assert_eq!(view.render_text(), "Assistant:\n  x");
    }

    #[test]
    fn placeholder_and_submit_label_follow_loading() {
        let typing = typing_placeholder();
        assert_eq!(typing.alignment, Alignment::Start);
        assert_eq!(typing.content, "Typing...");
        assert_eq!(submit_label(true), "Sending...");
        assert_eq!(submit_label(false), "Send");
    }

    #[test]
    fn text_rendering_keeps_line_breaks() {
        let view = MessageView::new_in(&ChatMessage::user("a\nb", at(8, 0)), &Utc);
        assert_eq!(view.render_text(), "    You [08:00]:\n      a\n      b");
    }
}
