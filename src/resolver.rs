//! Package resolution
//!
//! Maps a flat list of outdated or insecure package names, which may be
//! transitive dependencies, to the minimal set of direct packages whose
//! update command would cover them. Direct candidates pass through; for
//! the rest the Composer ownership queries are walked, and a candidate
//! with no reachable direct ancestor is scheduled as-is so no required
//! update is ever dropped.

use crate::composer::Composer;
use crate::domain::UpdatePlan;
use crate::error::CommandError;

/// Resolver from arbitrary candidates to a plan of direct packages
pub struct PackageResolver<'a> {
    composer: &'a Composer<'a>,
}

impl<'a> PackageResolver<'a> {
    /// Create a resolver backed by the given Composer adapter
    pub fn new(composer: &'a Composer<'a>) -> Self {
        Self { composer }
    }

    /// Resolve candidates against the authoritative direct package list.
    ///
    /// The plan lists direct candidates first, in candidate order, then
    /// one resolved ancestor (or fallback) per transitive candidate, in
    /// candidate order; duplicates collapse onto first-seen position.
    pub fn resolve(
        &self,
        candidates: &[String],
        direct: &[String],
    ) -> Result<UpdatePlan, CommandError> {
        let mut plan = UpdatePlan::new();

        let (direct_candidates, transitive): (Vec<&String>, Vec<&String>) = candidates
            .iter()
            .partition(|candidate| direct.contains(candidate));

        for candidate in direct_candidates {
            plan.push(candidate.clone());
        }

        for candidate in transitive {
            match self.find_direct_ancestor(candidate, direct)? {
                Some(ancestor) => plan.push(ancestor),
                None => {
                    plan.push(candidate.clone());
                    plan.record_fallback(candidate.clone());
                }
            }
        }

        Ok(plan)
    }

    /// Walk the ownership queries looking for a direct ancestor.
    ///
    /// The non-recursive query runs first; only if it yields no direct
    /// dependent does the bounded recursive query run. First match wins,
    /// so identical query output always resolves identically.
    fn find_direct_ancestor(
        &self,
        package: &str,
        direct: &[String],
    ) -> Result<Option<String>, CommandError> {
        let dependents = self.composer.why(package)?;
        if let Some(found) = first_direct(&dependents, direct) {
            return Ok(Some(found));
        }

        let recursive = match self.composer.why_recursive(package) {
            Ok(dependents) => dependents,
            // Timeout expiry means "no answer in time", not a broken run.
            Err(err) if err.is_timeout() => Vec::new(),
            Err(err) => return Err(err),
        };
        Ok(first_direct(&recursive, direct))
    }
}

/// First name from the ordered query output that is a direct package
fn first_direct(dependents: &[String], direct: &[String]) -> Option<String> {
    dependents
        .iter()
        .find(|name| direct.contains(name))
        .cloned()
}
