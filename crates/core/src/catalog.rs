//! Region filtering of the country catalog into a session's candidate pool.

use thiserror::Error;

use crate::model::{CountryRecord, QuizSettings, RegionFilter};

/// Fewest records a pool may hold: one correct answer plus three distractors.
pub const MIN_CANDIDATES: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("only {found} eligible countries in {region}, need at least 4")]
pub struct InsufficientCandidates {
    pub region: RegionFilter,
    pub found: usize,
}

/// One-time notice raised when a region filter had to be widened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackNotice {
    pub requested: RegionFilter,
    pub found: usize,
}

impl FallbackNotice {
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Not enough countries in {} region. Using all countries instead.",
            self.requested
        )
    }
}

/// Candidate pool for one session, with the settings actually in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePool {
    pub records: Vec<CountryRecord>,
    pub settings: QuizSettings,
    pub notice: Option<FallbackNotice>,
}

impl CandidatePool {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Keep the records in `region` (or all of them).
///
/// # Errors
///
/// Returns `InsufficientCandidates` when fewer than `MIN_CANDIDATES` records match.
pub fn filter_by_region(
    all: &[CountryRecord],
    region: RegionFilter,
) -> Result<Vec<CountryRecord>, InsufficientCandidates> {
    let filtered: Vec<CountryRecord> = all
        .iter()
        .filter(|record| region.matches(record.region()))
        .cloned()
        .collect();

    if filtered.len() < MIN_CANDIDATES {
        return Err(InsufficientCandidates {
            region,
            found: filtered.len(),
        });
    }
    Ok(filtered)
}

/// Build the pool for `settings`, widening to every region when the filter is too narrow.
///
/// The returned `settings` carry the region actually used. If even the full
/// catalog is below the minimum, the whole catalog is returned as-is and the
/// selector degrades the option count.
#[must_use]
pub fn build_pool(all: &[CountryRecord], settings: QuizSettings) -> CandidatePool {
    match filter_by_region(all, settings.region()) {
        Ok(records) => CandidatePool {
            records,
            settings,
            notice: None,
        },
        Err(InsufficientCandidates { region, found }) => {
            let notice = (region != RegionFilter::All).then_some(FallbackNotice {
                requested: region,
                found,
            });
            CandidatePool {
                records: all.to_vec(),
                settings: settings.with_all_regions(),
                notice,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CountryDraft, Difficulty, Region};

    fn country(code: &str, region: Region) -> CountryRecord {
        CountryDraft {
            id: code.into(),
            common_name: format!("Country {code}"),
            capital: Some(format!("Capital {code}")),
            region: Some(region),
            population: 1_000,
            ..CountryDraft::default()
        }
        .validate()
        .unwrap()
    }

    fn catalog() -> Vec<CountryRecord> {
        vec![
            country("AUS", Region::Oceania),
            country("NZL", Region::Oceania),
            country("FJI", Region::Oceania),
            country("FRA", Region::Europe),
            country("DEU", Region::Europe),
            country("ITA", Region::Europe),
            country("ESP", Region::Europe),
            country("JPN", Region::Asia),
        ]
    }

    #[test]
    fn all_returns_everything() {
        let records = filter_by_region(&catalog(), RegionFilter::All).unwrap();
        assert_eq!(records.len(), 8);
    }

    #[test]
    fn region_filter_keeps_matching_records() {
        let records = filter_by_region(&catalog(), RegionFilter::Only(Region::Europe)).unwrap();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.region() == Some(Region::Europe)));
    }

    #[test]
    fn small_region_signals_insufficient() {
        let err = filter_by_region(&catalog(), RegionFilter::Only(Region::Oceania)).unwrap_err();
        assert_eq!(err.found, 3);
    }

    #[test]
    fn pool_falls_back_to_all_with_one_notice() {
        let settings =
            QuizSettings::new(RegionFilter::Only(Region::Oceania), 10, Difficulty::Easy).unwrap();
        let pool = build_pool(&catalog(), settings);

        assert_eq!(pool.len(), 8);
        assert_eq!(pool.settings.region(), RegionFilter::All);
        let notice = pool.notice.expect("fallback notice");
        assert_eq!(
            notice.message(),
            "Not enough countries in Oceania region. Using all countries instead."
        );
    }

    #[test]
    fn pool_without_fallback_has_no_notice() {
        let settings =
            QuizSettings::new(RegionFilter::Only(Region::Europe), 10, Difficulty::Easy).unwrap();
        let pool = build_pool(&catalog(), settings);
        assert!(pool.notice.is_none());
        assert_eq!(pool.settings, settings);
    }
}
