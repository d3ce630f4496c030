use super::types::{Candidate, ReconciledRepo, StarCount, StarredMap};

/// Join candidates with the starred map.
///
/// The result has the same length and order as `candidates`. Lookups use the
/// catalog `repo` string verbatim.
pub fn reconcile(candidates: &[Candidate], starred: &StarredMap) -> Vec<ReconciledRepo> {
    candidates
        .iter()
        .map(|candidate| match starred.get(candidate.repo()) {
            Some(repo) => ReconciledRepo {
                candidate: candidate.clone(),
                is_starred: true,
                star_count: StarCount::Known(repo.star_count),
            },
            None => ReconciledRepo {
                candidate: candidate.clone(),
                is_starred: false,
                star_count: StarCount::Unknown,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stars::types::{CatalogEntry, StarredRepo};

    fn candidate(repo: &str) -> Candidate {
        Candidate::new(CatalogEntry::Plugin {
            name: repo.to_string(),
            id: repo.to_string(),
            repo: repo.to_string(),
        })
    }

    fn starred(entries: &[(&str, u64)]) -> StarredMap {
        entries
            .iter()
            .map(|(repo, star_count)| {
                (
                    repo.to_string(),
                    StarredRepo {
                        repo: repo.to_string(),
                        star_count: *star_count,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_reconcile_starred_candidate() {
        let result = reconcile(&[candidate("a/b")], &starred(&[("a/b", 42)]));

        assert_eq!(result.len(), 1);
        assert!(result[0].is_starred);
        assert_eq!(result[0].star_count, StarCount::Known(42));
    }

    #[test]
    fn test_reconcile_keeps_length_and_order() {
        let candidates = vec![
            candidate("z/last"),
            candidate("a/b"),
            candidate("m/mid"),
            candidate("c/d"),
        ];
        let map = starred(&[("c/d", 7), ("a/b", 42), ("x/unrelated", 1)]);

        let result = reconcile(&candidates, &map);

        let repos: Vec<&str> = result.iter().map(|r| r.candidate.repo()).collect();
        assert_eq!(repos, vec!["z/last", "a/b", "m/mid", "c/d"]);
        let flags: Vec<bool> = result.iter().map(|r| r.is_starred).collect();
        assert_eq!(flags, vec![false, true, false, true]);
        assert_eq!(result[0].star_count, StarCount::Unknown);
        assert_eq!(result[3].star_count, StarCount::Known(7));
    }

    #[test]
    fn test_reconcile_is_case_sensitive() {
        let result = reconcile(&[candidate("Owner/Repo")], &starred(&[("owner/repo", 3)]));
        assert!(!result[0].is_starred);
    }

    #[test]
    fn test_reconcile_empty_inputs() {
        assert!(reconcile(&[], &starred(&[("a/b", 1)])).is_empty());

        let result = reconcile(&[candidate("a/b")], &StarredMap::new());
        assert_eq!(result[0].star_count, StarCount::Unknown);
    }
}
