//! Per-variant question construction and hint sets.

use geoquiz_core::ledger::{CORRECT_POINTS, PENALTY_POINTS};
use geoquiz_core::model::{
    AnswerOption, CountryRecord, Difficulty, Hint, HintKind, Question, QuestionPrompt, VariantId,
};
use geoquiz_core::selector::Round;

const NOT_AVAILABLE: &str = "N/A";

/// Strategy that specializes the shared session engine for one quiz variant.
pub trait QuizVariant: Send + Sync {
    fn id(&self) -> VariantId;

    /// Whether a record carries every field this variant needs.
    fn is_eligible(&self, record: &CountryRecord) -> bool;

    /// Turn a selected round into a question, or `None` if a record lacks a needed field.
    fn build_question(&self, round: &Round) -> Option<Question>;

    /// Every hint this variant can offer for `correct`.
    fn hint_candidates(&self, correct: &CountryRecord, difficulty: Difficulty) -> Vec<Hint>;

    fn correct_feedback(&self, score: u32) -> String {
        format!("Correct! +{CORRECT_POINTS} points! Your score: {score}")
    }

    fn incorrect_feedback(&self, question: &Question) -> String {
        format!(
            "Incorrect! The answer was {}. -{PENALTY_POINTS} point",
            question.correct_label()
        )
    }

    fn timeout_feedback(&self, question: &Question) -> String {
        format!(
            "Time's up! The answer was {}. -{PENALTY_POINTS} point",
            question.correct_label()
        )
    }

    fn skip_feedback(&self, question: &Question) -> String {
        format!("Skipped. The answer was {}.", question.correct_label())
    }
}

/// The strategy for `id`.
#[must_use]
pub fn variant_for(id: VariantId) -> Box<dyn QuizVariant> {
    match id {
        VariantId::Flag => Box::new(FlagVariant),
        VariantId::Capital => Box::new(CapitalVariant),
        VariantId::FlagToCapital => Box::new(FlagToCapitalVariant),
    }
}

/// Which country does this flag belong to?
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagVariant;

/// Which country has this capital city?
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalVariant;

/// What is the capital of the country with this flag?
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagToCapitalVariant;

impl QuizVariant for FlagVariant {
    fn id(&self) -> VariantId {
        VariantId::Flag
    }

    fn is_eligible(&self, record: &CountryRecord) -> bool {
        record.flag_image().is_some() && record.capital().is_some() && record.population() > 0
    }

    fn build_question(&self, round: &Round) -> Option<Question> {
        let image = round.correct.flag_image()?.to_owned();
        Some(Question::new(
            round.correct.clone(),
            QuestionPrompt::Flag { image },
            name_options(&round.options),
        ))
    }

    fn hint_candidates(&self, correct: &CountryRecord, _difficulty: Difficulty) -> Vec<Hint> {
        vec![
            Hint::new(
                HintKind::Capital,
                format!("Capital: {}", correct.capital().unwrap_or(NOT_AVAILABLE)),
            ),
            region_hint("Region", correct),
            population_hint(correct),
            area_hint(correct),
        ]
    }
}

impl QuizVariant for CapitalVariant {
    fn id(&self) -> VariantId {
        VariantId::Capital
    }

    fn is_eligible(&self, record: &CountryRecord) -> bool {
        record.capital().is_some() && record.population() > 0
    }

    fn build_question(&self, round: &Round) -> Option<Question> {
        let capital = round.correct.capital()?.to_owned();
        Some(Question::new(
            round.correct.clone(),
            QuestionPrompt::CapitalName { capital },
            name_options(&round.options),
        ))
    }

    fn hint_candidates(&self, correct: &CountryRecord, _difficulty: Difficulty) -> Vec<Hint> {
        vec![
            region_hint("Continent", correct),
            population_hint(correct),
            area_hint(correct),
            language_hint(correct),
        ]
    }
}

impl QuizVariant for FlagToCapitalVariant {
    fn id(&self) -> VariantId {
        VariantId::FlagToCapital
    }

    fn is_eligible(&self, record: &CountryRecord) -> bool {
        record.flag_image().is_some() && record.capital().is_some() && record.population() > 0
    }

    fn build_question(&self, round: &Round) -> Option<Question> {
        let image = round.correct.flag_image()?.to_owned();
        let options = round
            .options
            .iter()
            .map(|record| {
                record.capital().map(|capital| AnswerOption {
                    id: record.id().clone(),
                    label: capital.to_owned(),
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Question::new(
            round.correct.clone(),
            QuestionPrompt::FlagForCapital { image },
            options,
        ))
    }

    fn hint_candidates(&self, correct: &CountryRecord, difficulty: Difficulty) -> Vec<Hint> {
        let mut hints = Vec::with_capacity(5);
        if difficulty == Difficulty::Easy {
            hints.push(Hint::new(
                HintKind::CountryName,
                format!("Country: {}", correct.common_name()),
            ));
        }
        hints.extend([
            region_hint("Continent", correct),
            population_hint(correct),
            area_hint(correct),
            language_hint(correct),
        ]);
        hints
    }

    fn incorrect_feedback(&self, question: &Question) -> String {
        format!(
            "Incorrect! The capital of {} is {}. -{PENALTY_POINTS} point",
            question.correct().common_name(),
            question.correct_label()
        )
    }
}

fn name_options(records: &[CountryRecord]) -> Vec<AnswerOption> {
    records
        .iter()
        .map(|record| AnswerOption {
            id: record.id().clone(),
            label: record.common_name().to_owned(),
        })
        .collect()
}

fn region_hint(label: &str, record: &CountryRecord) -> Hint {
    let region = record.region().map_or(NOT_AVAILABLE, |region| region.as_str());
    Hint::new(HintKind::Region, format!("{label}: {region}"))
}

fn population_hint(record: &CountryRecord) -> Hint {
    let population = match record.population() {
        0 => NOT_AVAILABLE.to_owned(),
        value => group_thousands(value),
    };
    Hint::new(HintKind::Population, format!("Population: {population}"))
}

fn area_hint(record: &CountryRecord) -> Hint {
    let area = record.area().map_or_else(|| NOT_AVAILABLE.to_owned(), format_area);
    Hint::new(HintKind::Area, format!("Area: {area} km²"))
}

fn language_hint(record: &CountryRecord) -> Hint {
    Hint::new(
        HintKind::Language,
        format!("Language: {}", record.primary_language().unwrap_or(NOT_AVAILABLE)),
    )
}

/// `1234567` -> `"1,234,567"`.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Grouped integer part plus up to three trimmed decimals, e.g. `"0.44"` or `"551,695"`.
#[must_use]
pub fn format_area(area: f64) -> String {
    let thousandths = (area * 1000.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let thousandths = if thousandths.is_finite() && thousandths >= 0.0 {
        thousandths as u64
    } else {
        0
    };
    let whole = group_thousands(thousandths / 1000);
    let fraction = thousandths % 1000;
    if fraction == 0 {
        return whole;
    }
    let decimals = format!("{fraction:03}");
    format!("{whole}.{}", decimals.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoquiz_core::model::{CountryDraft, Region};

    fn france() -> CountryRecord {
        CountryDraft {
            id: "FRA".into(),
            common_name: "France".into(),
            capital: Some("Paris".into()),
            region: Some(Region::Europe),
            population: 67_391_582,
            area: Some(551_695.0),
            languages: vec!["French".into()],
            flag_image: Some("https://flagcdn.com/w320/fr.png".into()),
        }
        .validate()
        .unwrap()
    }

    fn bare(code: &str) -> CountryRecord {
        CountryDraft {
            id: code.into(),
            common_name: format!("Country {code}"),
            capital: Some(format!("Capital {code}")),
            population: 10,
            ..CountryDraft::default()
        }
        .validate()
        .unwrap()
    }

    fn round() -> Round {
        let correct = france();
        Round {
            options: vec![bare("DEU"), correct.clone(), bare("ITA"), bare("ESP")],
            correct,
            degraded: false,
        }
    }

    #[test]
    fn flag_question_offers_country_names() {
        let question = FlagVariant.build_question(&round()).unwrap();
        let labels: Vec<&str> = question.options().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Country DEU", "France", "Country ITA", "Country ESP"]);
        assert!(matches!(question.prompt(), QuestionPrompt::Flag { .. }));
    }

    #[test]
    fn flag_to_capital_offers_capitals_keyed_by_country() {
        let question = FlagToCapitalVariant.build_question(&round()).unwrap();
        let paris = question
            .options()
            .iter()
            .find(|o| o.label == "Paris")
            .unwrap();
        assert!(question.is_correct(&paris.id));
        assert_eq!(
            FlagToCapitalVariant.incorrect_feedback(&question),
            "Incorrect! The capital of France is Paris. -1 point"
        );
    }

    #[test]
    fn capital_prompt_names_the_city() {
        let question = CapitalVariant.build_question(&round()).unwrap();
        assert_eq!(
            question.prompt(),
            &QuestionPrompt::CapitalName {
                capital: "Paris".into()
            }
        );
    }

    #[test]
    fn flag_question_needs_an_image() {
        let correct = bare("DEU");
        let round = Round {
            options: vec![correct.clone(), bare("ITA")],
            correct,
            degraded: false,
        };
        assert!(FlagVariant.build_question(&round).is_none());
        assert!(!FlagVariant.is_eligible(&bare("DEU")));
        assert!(CapitalVariant.is_eligible(&bare("DEU")));
    }

    #[test]
    fn flag_hints_match_the_classic_set() {
        let texts: Vec<String> = FlagVariant
            .hint_candidates(&france(), Difficulty::Easy)
            .into_iter()
            .map(|h| h.text)
            .collect();
        assert_eq!(
            texts,
            vec![
                "Capital: Paris",
                "Region: Europe",
                "Population: 67,391,582",
                "Area: 551,695 km²",
            ]
        );
    }

    #[test]
    fn hard_mode_hides_the_country_name() {
        let easy = FlagToCapitalVariant.hint_candidates(&france(), Difficulty::Easy);
        let hard = FlagToCapitalVariant.hint_candidates(&france(), Difficulty::Hard);
        assert!(easy.iter().any(|h| h.kind == HintKind::CountryName));
        assert!(!hard.iter().any(|h| h.kind == HintKind::CountryName));
        assert_eq!(hard.len(), 4);
    }

    #[test]
    fn missing_values_render_as_na() {
        let hints = CapitalVariant.hint_candidates(&bare("XYZ"), Difficulty::Easy);
        let texts: Vec<&str> = hints.iter().map(|h| h.text.as_str()).collect();
        assert!(texts.contains(&"Continent: N/A"));
        assert!(texts.contains(&"Area: N/A km²"));
        assert!(texts.contains(&"Language: N/A"));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(format_area(0.44), "0.44");
        assert_eq!(format_area(41_284.5), "41,284.5");
        assert_eq!(format_area(1.0), "1");
    }
}
