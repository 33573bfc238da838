//! Plural form selection per locale.
//!
//! Every rule is a pure function from a count to a form index in
//! `0..rule.forms()`. The index addresses the `<numerusform>` entries of a
//! numerus message, so the number of forms of a language is part of the
//! catalog contract, not only of the selection.

use strum::Display;
use unic_langid::LanguageIdentifier;

/// Grammatical plural families.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum PluralFamily {
    /// One form for every count.
    NoPlural,
    /// `1` is singular, everything else plural.
    English,
    /// `0` and `1` are singular, everything else plural.
    French,
    /// Singular for counts ending in 1 except 11.
    Icelandic,
    Latvian,
    Irish,
    Romanian,
    Lithuanian,
    /// Russian, Ukrainian, Belarusian, Serbian, Croatian, Bosnian.
    Slavic,
    /// Czech and Slovak.
    Czech,
    Polish,
    Slovenian,
    Maltese,
    Welsh,
    Arabic,
}

impl PluralFamily {
    pub fn forms(self) -> usize {
        match self {
            PluralFamily::NoPlural => 1,
            PluralFamily::English | PluralFamily::French | PluralFamily::Icelandic => 2,
            PluralFamily::Latvian
            | PluralFamily::Irish
            | PluralFamily::Romanian
            | PluralFamily::Lithuanian
            | PluralFamily::Slavic
            | PluralFamily::Czech
            | PluralFamily::Polish => 3,
            PluralFamily::Slovenian | PluralFamily::Maltese | PluralFamily::Welsh => 4,
            PluralFamily::Arabic => 6,
        }
    }

    pub fn select(self, n: u64) -> usize {
        let n10 = n % 10;
        let n100 = n % 100;
        match self {
            PluralFamily::NoPlural => 0,
            PluralFamily::English => usize::from(n != 1),
            PluralFamily::French => usize::from(n > 1),
            PluralFamily::Icelandic => usize::from(!(n10 == 1 && n100 != 11)),
            PluralFamily::Latvian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            },
            PluralFamily::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            PluralFamily::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&n100) {
                    1
                } else {
                    2
                }
            },
            PluralFamily::Lithuanian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n10 >= 2 && !(10..20).contains(&n100) {
                    1
                } else {
                    2
                }
            },
            PluralFamily::Slavic => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            },
            PluralFamily::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            PluralFamily::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            },
            PluralFamily::Slovenian => match n100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            PluralFamily::Maltese => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=10).contains(&n100) {
                    1
                } else if (11..=19).contains(&n100) {
                    2
                } else {
                    3
                }
            },
            PluralFamily::Welsh => match n {
                1 => 0,
                2 => 1,
                8 | 11 => 2,
                _ => 3,
            },
            PluralFamily::Arabic => {
                if n == 0 {
                    0
                } else if n == 1 {
                    1
                } else if n == 2 {
                    2
                } else if (3..=10).contains(&n100) {
                    3
                } else if (11..=99).contains(&n100) {
                    4
                } else {
                    5
                }
            },
        }
    }
}

/// The plural rule of one locale.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PluralRule {
    locale: String,
    family: PluralFamily,
}

impl PluralRule {
    /// The locale string this rule was looked up with.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn family(&self) -> PluralFamily {
        self.family
    }

    /// Number of plural forms a numerus translation must carry.
    pub fn forms(&self) -> usize {
        self.family.forms()
    }

    /// Index of the form to use for `n`; always below [`Self::forms`].
    pub fn select(&self, n: u64) -> usize {
        self.family.select(n)
    }
}

/// Returns the plural rule for `locale` (`fr_FR`, `fr-FR` and `fr` are all
/// accepted), falling back to the English rule for unknown locales.
pub fn rule(locale: &str) -> PluralRule {
    let family = parse_locale(locale)
        .map(|lang| family_for(&lang))
        .unwrap_or(PluralFamily::English);
    PluralRule {
        locale: locale.to_string(),
        family,
    }
}

/// The rule for an optional catalog language.
pub fn rule_for(language: Option<&str>) -> PluralRule {
    rule(language.unwrap_or_default())
}

fn parse_locale(locale: &str) -> Option<LanguageIdentifier> {
    if locale.is_empty() {
        return None;
    }
    locale.replace('_', "-").parse().ok()
}

fn family_for(lang: &LanguageIdentifier) -> PluralFamily {
    let region = lang.region.as_ref().map(|r| r.as_str());
    match (lang.language.as_str(), region) {
        ("pt", Some("BR")) => PluralFamily::French,
        ("ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "lo" | "km" | "my", _) => {
            PluralFamily::NoPlural
        },
        ("fr" | "oc" | "tl" | "fil" | "ak" | "am" | "ln" | "mg" | "ti" | "wa", _) => {
            PluralFamily::French
        },
        ("is", _) => PluralFamily::Icelandic,
        ("lv", _) => PluralFamily::Latvian,
        ("ga", _) => PluralFamily::Irish,
        ("ro" | "mo", _) => PluralFamily::Romanian,
        ("lt", _) => PluralFamily::Lithuanian,
        ("ru" | "uk" | "be" | "sr" | "hr" | "bs", _) => PluralFamily::Slavic,
        ("cs" | "sk", _) => PluralFamily::Czech,
        ("pl", _) => PluralFamily::Polish,
        ("sl", _) => PluralFamily::Slovenian,
        ("mt", _) => PluralFamily::Maltese,
        ("cy", _) => PluralFamily::Welsh,
        ("ar", _) => PluralFamily::Arabic,
        _ => PluralFamily::English,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ALL: [PluralFamily; 15] = [
        PluralFamily::NoPlural,
        PluralFamily::English,
        PluralFamily::French,
        PluralFamily::Icelandic,
        PluralFamily::Latvian,
        PluralFamily::Irish,
        PluralFamily::Romanian,
        PluralFamily::Lithuanian,
        PluralFamily::Slavic,
        PluralFamily::Czech,
        PluralFamily::Polish,
        PluralFamily::Slovenian,
        PluralFamily::Maltese,
        PluralFamily::Welsh,
        PluralFamily::Arabic,
    ];

    #[test]
    fn test_french_rule_treats_zero_as_singular() {
        let fr = rule("fr_FR");
        assert_eq!(fr.forms(), 2);
        assert_eq!(fr.select(0), 0);
        assert_eq!(fr.select(1), 0);
        assert_eq!(fr.select(2), 1);
        assert_eq!(fr.select(100), 1);
    }

    #[rstest]
    #[case("", PluralFamily::English)]
    #[case("xx_YY_not a locale", PluralFamily::English)]
    #[case("tlh", PluralFamily::English)]
    #[case("de_DE", PluralFamily::English)]
    #[case("pt_BR", PluralFamily::French)]
    #[case("fil", PluralFamily::French)]
    #[case("pt-PT", PluralFamily::English)]
    #[case("zh_CN", PluralFamily::NoPlural)]
    #[case("ru", PluralFamily::Slavic)]
    #[case("cs_CZ", PluralFamily::Czech)]
    #[case("ar", PluralFamily::Arabic)]
    fn test_rule_lookup(#[case] locale: &str, #[case] expected: PluralFamily) {
        assert_eq!(rule(locale).family(), expected);
    }

    #[rstest]
    #[case(PluralFamily::Slavic, 1, 0)]
    #[case(PluralFamily::Slavic, 3, 1)]
    #[case(PluralFamily::Slavic, 11, 2)]
    #[case(PluralFamily::Slavic, 12, 2)]
    #[case(PluralFamily::Slavic, 21, 0)]
    #[case(PluralFamily::Slavic, 24, 1)]
    #[case(PluralFamily::Polish, 1, 0)]
    #[case(PluralFamily::Polish, 21, 2)]
    #[case(PluralFamily::Polish, 22, 1)]
    #[case(PluralFamily::Czech, 4, 1)]
    #[case(PluralFamily::Czech, 5, 2)]
    #[case(PluralFamily::Arabic, 0, 0)]
    #[case(PluralFamily::Arabic, 105, 3)]
    #[case(PluralFamily::Arabic, 111, 4)]
    #[case(PluralFamily::Arabic, 200, 5)]
    #[case(PluralFamily::Slovenian, 101, 0)]
    #[case(PluralFamily::Latvian, 0, 2)]
    #[case(PluralFamily::Romanian, 119, 1)]
    fn test_select(#[case] family: PluralFamily, #[case] n: u64, #[case] expected: usize) {
        assert_eq!(family.select(n), expected);
    }

    #[test]
    fn test_selection_is_total_and_in_range() {
        for family in ALL {
            for n in (0..1_000).chain([u64::MAX - 1, u64::MAX]) {
                assert!(
                    family.select(n) < family.forms(),
                    "{family} selected out of range for {n}"
                );
            }
        }
    }
}
