//! Shared text shaping and truncation policies for compact UI surfaces.

use crate::catalog::Group;

pub const SHORT_TITLE_MAX_CHARS: usize = 25;
pub const SHORT_TITLE_CUT_CHARS: usize = 22;
pub const LOADING_LABEL: &str = "Loading...";

/// Header label for a group: `"Friends S01E01"` for episodes, otherwise the
/// title shortened at a colon or truncated.
pub fn short_title(group: Option<&Group>) -> String {
    let Some(group) = group else {
        return LOADING_LABEL.to_string();
    };

    if let (Some(series), Some(season), Some(episode)) = (
        group.detail("series"),
        group.detail("season"),
        group.detail("episode"),
    ) {
        return format!("{series} S{season:0>2}E{episode:0>2}");
    }

    let title = group.title.as_str();
    if title.chars().count() <= SHORT_TITLE_MAX_CHARS {
        return title.to_string();
    }

    if let Some(colon) = title.find(':') {
        let colon_chars = title[..colon].chars().count();
        if colon_chars > 0 && colon_chars < SHORT_TITLE_MAX_CHARS {
            return title[..colon].to_string();
        }
    }

    let mut cut: String = title.chars().take(SHORT_TITLE_CUT_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Full header label.
pub fn full_title(group: Option<&Group>) -> &str {
    group.map_or(LOADING_LABEL, |group| group.title.as_str())
}

/// One-based position label, `"3 / 12"`.
pub fn counter_label(current_index: usize, total: usize) -> String {
    if total == 0 {
        return "0 / 0".to_string();
    }
    format!("{} / {}", current_index.min(total - 1) + 1, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_friends_catalog;
    use crate::catalog::ScriptCatalog;

    fn titled(title: &str) -> Group {
        Group {
            id: "g".into(),
            title: title.into(),
            category: "Misc".into(),
            sub_category: None,
            description: None,
            details: None,
            member_ids: Vec::new(),
        }
    }

    #[test]
    fn episode_details_win_over_title() {
        let catalog = default_friends_catalog();
        assert_eq!(short_title(catalog.groups().first()), "Friends S01E01");
    }

    #[test]
    fn blank_or_zero_episode_details_fall_back_to_title() {
        let with_details = |season: serde_json::Value, series: &str| {
            let mut group = titled("Pilot");
            group.details = Some(
                [
                    ("series".to_string(), serde_json::json!(series)),
                    ("season".to_string(), season),
                    ("episode".to_string(), serde_json::json!(3)),
                ]
                .into_iter()
                .collect(),
            );
            group
        };

        assert_eq!(short_title(Some(&with_details(serde_json::json!(0), "Show"))), "Pilot");
        assert_eq!(short_title(Some(&with_details(serde_json::json!(""), "Show"))), "Pilot");
        assert_eq!(short_title(Some(&with_details(serde_json::json!(false), "Show"))), "Pilot");
        assert_eq!(short_title(Some(&with_details(serde_json::json!(2), ""))), "Pilot");
        assert_eq!(
            short_title(Some(&with_details(serde_json::json!(2), "Show"))),
            "Show S02E03"
        );
    }

    #[test]
    fn long_title_is_cut_at_colon() {
        let group = titled("Steve Jobs: Stanford Commencement Address 2005");
        assert_eq!(short_title(Some(&group)), "Steve Jobs");
    }

    #[test]
    fn long_title_without_early_colon_is_truncated() {
        let group = titled("A very long presentation title without breaks");
        assert_eq!(short_title(Some(&group)), "A very long presentati...");
    }

    #[test]
    fn short_titles_and_missing_groups() {
        assert_eq!(short_title(Some(&titled("Short one"))), "Short one");
        assert_eq!(short_title(None), LOADING_LABEL);
    }

    #[test]
    fn counter_is_one_based() {
        assert_eq!(counter_label(0, 3), "1 / 3");
        assert_eq!(counter_label(2, 3), "3 / 3");
        assert_eq!(counter_label(0, 0), "0 / 0");
    }
}
