use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SPACE_OR_HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-]+").unwrap());

/// Lower-cases `text` and turns it into a hyphen-joined slug.
///
/// `The Plant Accelerator` -> `the-plant-accelerator`
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let kept = NON_SLUG_CHARS.replace_all(&lower, "");
    let hyphenated = SPACE_OR_HYPHEN_RUNS.replace_all(&kept, "-");
    hyphenated.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(slugify("The Plant Accelerator"), "the-plant-accelerator");
        assert_eq!(slugify("APPN"), "appn");
        assert_eq!(slugify("Hoang Son Le"), "hoang-son-le");
        assert_eq!(slugify("  test -- project! "), "test-project");
        assert_eq!(slugify("trial_alpha"), "trial_alpha");
        assert_eq!(slugify("!!!"), "");
    }
}
