//! Project tree layout shared by the update phases

use std::path::Path;

/// Composer manifest file name
pub const MANIFEST_FILE: &str = "composer.json";

/// Composer lock file name
pub const LOCK_FILE: &str = "composer.lock";

/// Run-scoped copy of the lock file taken before any update
pub const LOCK_SNAPSHOT_FILE: &str = "composer.drupdater.lock";

/// Directory holding exported Drupal configuration
pub const CONFIG_PATH: &str = "config";

/// Candidate Drupal web root directories, probed in order
const WEB_ROOT_CANDIDATES: [&str; 3] = ["web", "docroot", "public_html"];

/// Locate the Drupal web root under the project directory.
///
/// Returns the first candidate that is a real directory; symlinked
/// candidates are skipped so a deploy link never gets staged wholesale.
pub fn find_web_root(project_root: &Path) -> Option<&'static str> {
    WEB_ROOT_CANDIDATES.into_iter().find(|candidate| {
        let path = project_root.join(candidate);
        path.is_dir() && !path.is_symlink()
    })
}
