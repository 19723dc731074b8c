//! URL slug generation for message titles.
//!
//! One rule is used everywhere a message URL is produced: sitemap entries,
//! static page paths, canonical links and structured data.

/// Title prefixes Message Center uses for revised announcements.
const REVISION_PREFIXES: &[&str] = &["updated:", "update:"];

/// Convert a message title to a URL path segment.
///
/// The result contains only `[a-z0-9-]`, never starts or ends with a hyphen
/// and never contains `--`. An empty result means no URL can be generated
/// for the title.
///
/// # Examples
///
/// | Title | Slug |
/// |-------|------|
/// | `Updated: Teams now supports X!` | `teams-now-supports-x` |
/// | `(Updated) Microsoft Purview — DLP` | `updated-microsoft-purview-dlp` |
/// | `Déploiement Outlook` | `deploiement-outlook` |
/// | `!!!` | `` |
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let stripped = strip_revision_prefix(&lowered);
    let ascii = deunicode::deunicode(stripped).to_ascii_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '_' || c == '-' {
            pending_hyphen = true;
        }
        // Everything else is dropped without acting as a separator.
    }

    slug
}

fn strip_revision_prefix(title: &str) -> &str {
    REVISION_PREFIXES
        .iter()
        .find_map(|prefix| title.strip_prefix(prefix))
        .map_or(title, str::trim_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(slug: &str) {
        assert!(
            slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "bad char in {slug:?}"
        );
        assert!(!slug.starts_with('-') && !slug.ends_with('-'), "edge hyphen in {slug:?}");
        assert!(!slug.contains("--"), "double hyphen in {slug:?}");
    }

    #[test]
    fn test_updated_prefix_is_stripped() {
        assert_eq!(slugify("Updated: Teams now supports X!"), "teams-now-supports-x");
        assert_eq!(slugify("Update: New admin center"), "new-admin-center");
        assert_eq!(slugify("UPDATED:   Exchange Online"), "exchange-online");
    }

    #[test]
    fn test_prefix_only_stripped_at_start() {
        assert_eq!(
            slugify("Teams Updated: new meeting view"),
            "teams-updated-new-meeting-view"
        );
    }

    #[test]
    fn test_punctuation_removed_without_separating() {
        assert_eq!(slugify("Don't miss: SharePoint's new look"), "dont-miss-sharepoints-new-look");
        assert_eq!(slugify("Microsoft 365 (preview) [beta]"), "microsoft-365-preview-beta");
    }

    #[test]
    fn test_whitespace_underscore_and_hyphen_runs_collapse() {
        assert_eq!(slugify("a  -  b__c\t\nd"), "a-b-c-d");
        assert_eq!(slugify("--leading and trailing--"), "leading-and-trailing");
    }

    #[test]
    fn test_non_ascii_letters_are_transliterated() {
        assert_eq!(slugify("Déploiement Outlook"), "deploiement-outlook");
        assert_eq!(slugify("Yılmaz über Ångström"), "yilmaz-uber-angstrom");
    }

    #[test]
    fn test_empty_and_symbol_only_titles() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!! ??? ..."), "");
        assert_eq!(slugify("Updated:"), "");
    }

    #[test]
    fn test_idempotent() {
        let titles = [
            "Updated: Teams now supports X!",
            "Microsoft Purview — Data Lifecycle Management",
            "  [Action required] Retire TLS 1.0/1.1  ",
            "Déploiement Outlook",
            "MC123456 — plan for change",
        ];
        for title in titles {
            let once = slugify(title);
            assert_eq!(slugify(&once), once, "not idempotent for {title:?}");
        }
    }

    #[test]
    fn test_well_formed_output() {
        let titles = [
            "Updated: Teams now supports X!",
            "___",
            "a--b",
            "🚀 Launch — Copilot in Word 🚀",
            "Retire TLS 1.0/1.1 on 2025-10-31",
            "Yammer => Viva Engage",
        ];
        for title in titles {
            assert_well_formed(&slugify(title));
        }
    }

    #[test]
    fn test_deterministic() {
        let title = "Microsoft Teams: New Meeting Experience";
        assert_eq!(slugify(title), slugify(title));
    }

    #[test]
    fn test_distinct_titles_can_collide() {
        // Known limitation: the slug alone does not disambiguate. The page
        // emitter detects and reports these collisions.
        assert_eq!(slugify("Teams: new feature"), slugify("Teams - New Feature!"));
    }
}
