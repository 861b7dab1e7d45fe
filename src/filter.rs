//! Eligibility rules: which events turn into a feedback report.
//!
//! The rules operate on plain views over an event so they can be tested
//! without a gateway connection. The router builds the views from
//! serenity types and performs whatever side effect the decision asks
//! for.

use crate::command::FeedbackKind;

/// Only messages under this category (or any category in test mode) are
/// forwarded.
pub const WISHLIST_CATEGORY: &str = "ventuz wishlist/requests";

/// What the router should do with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Build a report of this kind and forward it.
    Forward(FeedbackKind),
    /// Bot-authored "pins added" notice: delete it, never forward.
    DeletePinNotice,
    Ignore,
}

/// A message-created event, reduced to the fields the rules consult.
#[derive(Debug)]
pub struct MessageView<'a> {
    pub author_is_bot: bool,
    /// True for the platform's "message pinned" system message.
    pub is_pin_notice: bool,
    /// Whether the content starts with a configured command prefix.
    pub has_prefix: bool,
    /// Normalized command extracted from the content.
    pub command: &'a str,
    /// Lower-cased parent-category name, if the channel has one.
    pub category: Option<&'a str>,
}

/// A reaction-added event with its (possibly fetched) target message.
#[derive(Debug)]
pub struct ReactionView<'a> {
    pub reactor_is_bot: bool,
    /// Whether the target message starts with a configured prefix, i.e.
    /// was already submitted via the message path.
    pub message_has_prefix: bool,
    pub emoji_name: &'a str,
    pub category: Option<&'a str>,
    /// Whether the target message id is already in the submitted log.
    pub already_submitted: bool,
}

fn category_matches(category: Option<&str>, test_mode: bool) -> bool {
    test_mode || category == Some(WISHLIST_CATEGORY)
}

pub fn decide_message(view: &MessageView<'_>, test_mode: bool) -> Decision {
    if view.author_is_bot {
        if view.is_pin_notice {
            return Decision::DeletePinNotice;
        }
        return Decision::Ignore;
    }
    if !view.has_prefix {
        return Decision::Ignore;
    }
    if !category_matches(view.category, test_mode) {
        return Decision::Ignore;
    }
    match FeedbackKind::from_command(view.command) {
        Some(kind) => Decision::Forward(kind),
        None => Decision::Ignore,
    }
}

pub fn decide_reaction(view: &ReactionView<'_>, test_mode: bool) -> Decision {
    if view.reactor_is_bot {
        return Decision::Ignore;
    }
    // Prefixed messages go through the message path; a reaction on one
    // would double-submit.
    if view.message_has_prefix {
        return Decision::Ignore;
    }
    if !category_matches(view.category, test_mode) {
        return Decision::Ignore;
    }
    if view.already_submitted {
        return Decision::Ignore;
    }
    match FeedbackKind::from_command(view.emoji_name) {
        Some(kind) => Decision::Forward(kind),
        None => Decision::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message<'a>(command: &'a str, category: Option<&'a str>) -> MessageView<'a> {
        MessageView {
            author_is_bot: false,
            is_pin_notice: false,
            has_prefix: true,
            command,
            category,
        }
    }

    fn reaction<'a>(emoji: &'a str, category: Option<&'a str>) -> ReactionView<'a> {
        ReactionView {
            reactor_is_bot: false,
            message_has_prefix: false,
            emoji_name: emoji,
            category,
            already_submitted: false,
        }
    }

    #[test]
    fn test_bug_in_wishlist_is_forwarded() {
        let view = message("bug", Some(WISHLIST_CATEGORY));
        assert_eq!(decide_message(&view, false), Decision::Forward(FeedbackKind::Bug));
    }

    #[test]
    fn test_bot_author_is_ignored() {
        let mut view = message("bug", Some(WISHLIST_CATEGORY));
        view.author_is_bot = true;
        assert_eq!(decide_message(&view, false), Decision::Ignore);
    }

    #[test]
    fn test_bot_pin_notice_is_deleted() {
        let mut view = message("", Some(WISHLIST_CATEGORY));
        view.author_is_bot = true;
        view.is_pin_notice = true;
        view.has_prefix = false;
        assert_eq!(decide_message(&view, false), Decision::DeletePinNotice);
    }

    #[test]
    fn test_user_pin_notice_is_not_deleted() {
        let mut view = message("", Some(WISHLIST_CATEGORY));
        view.is_pin_notice = true;
        view.has_prefix = false;
        assert_eq!(decide_message(&view, false), Decision::Ignore);
    }

    #[test]
    fn test_missing_prefix_is_ignored() {
        let mut view = message("bug", Some(WISHLIST_CATEGORY));
        view.has_prefix = false;
        assert_eq!(decide_message(&view, false), Decision::Ignore);
    }

    #[test]
    fn test_wrong_category_is_ignored() {
        let view = message("bug", Some("general"));
        assert_eq!(decide_message(&view, false), Decision::Ignore);
    }

    #[test]
    fn test_test_mode_skips_category_gate() {
        let view = message("idea", Some("general"));
        assert_eq!(decide_message(&view, true), Decision::Forward(FeedbackKind::Idea));

        let view = message("idea", None);
        assert_eq!(decide_message(&view, true), Decision::Forward(FeedbackKind::Idea));
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let view = message("weather", Some(WISHLIST_CATEGORY));
        assert_eq!(decide_message(&view, false), Decision::Ignore);
    }

    #[test]
    fn test_reaction_is_forwarded() {
        let view = reaction("idea", Some(WISHLIST_CATEGORY));
        assert_eq!(decide_reaction(&view, false), Decision::Forward(FeedbackKind::Idea));
    }

    #[test]
    fn test_reaction_on_submitted_message_is_ignored() {
        let mut view = reaction("idea", Some(WISHLIST_CATEGORY));
        view.already_submitted = true;
        assert_eq!(decide_reaction(&view, false), Decision::Ignore);
    }

    #[test]
    fn test_reaction_on_prefixed_message_is_ignored() {
        let mut view = reaction("idea", Some(WISHLIST_CATEGORY));
        view.message_has_prefix = true;
        assert_eq!(decide_reaction(&view, false), Decision::Ignore);
    }

    #[test]
    fn test_bot_reactor_is_ignored() {
        let mut view = reaction("bug", Some(WISHLIST_CATEGORY));
        view.reactor_is_bot = true;
        assert_eq!(decide_reaction(&view, false), Decision::Ignore);
    }

    #[test]
    fn test_unrelated_emoji_is_ignored() {
        let view = reaction("thumbsup", Some(WISHLIST_CATEGORY));
        assert_eq!(decide_reaction(&view, false), Decision::Ignore);
    }
}
