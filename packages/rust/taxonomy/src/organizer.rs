//! Materializes the taxonomy as a directory tree.
//!
//! Layout under the target root:
//! ```text
//! primaire/<cycle>/<slug(matiere)>/<slug(stem)>.txt
//! college/<classe>/<slug(matiere)>/<slug(stem)>.txt
//! lycee/<classe>/<filiere>/<slug(matiere)>/<slug(stem)>.txt
//! ```
//! Files already present at the computed path are overwritten. A target root
//! nested inside the source tree is pruned from the walk, and a copy whose
//! target is its own source is refused.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use eduscol_shared::{EduscolError, Niveau, ProgressReporter, Result, TaxonomyRecord, slugify};

use crate::classifier::Classifier;

/// Extension of the text files the organizer consumes and produces.
const TEXT_EXTENSION: &str = ".txt";

/// A source file copied into the taxonomy tree.
#[derive(Debug, Clone)]
pub struct OrganizedFile {
    pub source: PathBuf,
    pub target: PathBuf,
    pub record: TaxonomyRecord,
}

/// Summary of an `organize_tree` run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct OrganizeReport {
    /// Files copied into the taxonomy tree.
    pub organized: usize,
    /// Files whose copy failed.
    pub failed: usize,
    /// Errors encountered (path, error message).
    pub errors: Vec<(String, String)>,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

/// Places classified text files under a target root.
pub struct Organizer {
    target_root: PathBuf,
    classifier: Classifier,
}

impl Organizer {
    /// Create an organizer writing below `target_root` with the standard classifier.
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        Self {
            target_root: target_root.into(),
            classifier: Classifier::standard(),
        }
    }

    /// Replace the classifier tables.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Directory a record is placed in.
    pub fn target_dir(&self, record: &TaxonomyRecord) -> PathBuf {
        let matiere = slugify(&record.matiere);
        let base = self.target_root.join(record.niveau.as_str());
        match record.niveau {
            Niveau::Primaire => base.join(&record.cycle).join(matiere),
            Niveau::College => base.join(&record.classe).join(matiere),
            Niveau::Lycee | Niveau::Unknown => base
                .join(&record.classe)
                .join(&record.filiere)
                .join(matiere),
        }
    }

    /// Classify one text file by its parent folder and name, then copy it into place.
    pub fn organize(&self, source: &Path) -> Result<OrganizedFile> {
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                EduscolError::validation(format!("not a UTF-8 file path: {}", source.display()))
            })?;
        let folder_name = source
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or("");

        let record = self.classifier.classify(folder_name, file_name);
        let dir = self.target_dir(&record);
        std::fs::create_dir_all(&dir).map_err(|e| EduscolError::io(&dir, e))?;

        let stem = file_name.strip_suffix(TEXT_EXTENSION).unwrap_or(file_name);
        let target = dir.join(format!("{}{TEXT_EXTENSION}", slugify(stem)));

        if is_same_file(source, &target) {
            return Err(EduscolError::validation(format!(
                "source and target are the same file: {}",
                source.display()
            )));
        }

        info!(source = %source.display(), target = %target.display(), "copying");
        copy_with_mtime(source, &target)?;

        Ok(OrganizedFile {
            source: source.to_path_buf(),
            target,
            record,
        })
    }

    /// Organize every `.txt` file below `source_dir`.
    ///
    /// A file that fails to copy is logged and counted; the walk continues.
    #[instrument(skip_all, fields(source = %source_dir.display(), target = %self.target_root.display()))]
    pub fn organize_tree(
        &self,
        source_dir: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<OrganizeReport> {
        let start = std::time::Instant::now();

        if !source_dir.is_dir() {
            return Err(EduscolError::validation(format!(
                "source directory does not exist: {}",
                source_dir.display()
            )));
        }

        std::fs::create_dir_all(&self.target_root)
            .map_err(|e| EduscolError::io(&self.target_root, e))?;
        let target_root = std::fs::canonicalize(&self.target_root)
            .map_err(|e| EduscolError::io(&self.target_root, e))?;
        let source_root =
            std::fs::canonicalize(source_dir).map_err(|e| EduscolError::io(source_dir, e))?;

        let mut report = OrganizeReport::default();

        let walker = WalkDir::new(&source_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let inside_target = entry.path().starts_with(&target_root);
                if inside_target {
                    debug!(path = %entry.path().display(), "skipping target tree");
                }
                !inside_target
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "unreadable directory entry");
                    report.failed += 1;
                    report.errors.push((
                        e.path().map(|p| p.display().to_string()).unwrap_or_default(),
                        e.to_string(),
                    ));
                    continue;
                }
            };

            let is_text = entry
                .file_name()
                .to_str()
                .is_some_and(|n| n.ends_with(TEXT_EXTENSION));
            if !entry.file_type().is_file() || !is_text {
                continue;
            }

            match self.organize(entry.path()) {
                Ok(file) => {
                    report.organized += 1;
                    progress.file_organized(&file.target.display().to_string(), report.organized);
                }
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "failed to organize file");
                    report.failed += 1;
                    report
                        .errors
                        .push((entry.path().display().to_string(), e.to_string()));
                }
            }
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            organized = report.organized,
            failed = report.failed,
            duration_ms = report.elapsed_ms,
            "organize completed"
        );

        Ok(report)
    }
}

/// Whether both paths resolve to the same existing file.
fn is_same_file(source: &Path, target: &Path) -> bool {
    match (std::fs::canonicalize(source), std::fs::canonicalize(target)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy `source` to `target`, keeping permissions and modification time.
fn copy_with_mtime(source: &Path, target: &Path) -> Result<()> {
    std::fs::copy(source, target).map_err(|e| EduscolError::io(target, e))?;

    let modified = std::fs::metadata(source)
        .and_then(|m| m.modified())
        .map_err(|e| EduscolError::io(source, e))?;

    let result = File::options()
        .write(true)
        .open(target)
        .and_then(|f| f.set_modified(modified));
    if let Err(e) = result {
        // Content is in place; a read-only copy just keeps the copy time.
        debug!(target = %target.display(), error = %e, "could not preserve modification time");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::classifier::{GradeRule, Matcher, TrackPolicy};
    use eduscol_shared::SilentProgress;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn target_dir_per_niveau() {
        let organizer = Organizer::new("/out");

        let primaire = crate::classify("cycle2", "annexe.txt");
        assert_eq!(
            organizer.target_dir(&primaire),
            PathBuf::from("/out/primaire/cycle2/cycle2")
        );

        let college = crate::classify("cycle4", "annexe.txt");
        assert_eq!(
            organizer.target_dir(&college),
            PathBuf::from("/out/college/5-4-3/cycle4")
        );

        let lycee = crate::classify("Sciences_économiques", "terminale_generale.txt");
        assert_eq!(
            organizer.target_dir(&lycee),
            PathBuf::from("/out/lycee/terminale/generale/sciences-economiques")
        );
    }

    #[test]
    fn organize_copies_under_slugified_name() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let source = src.path().join("Histoire_g_ographie").join("Programme_de_Premi_re_g_n_rale.txt");
        write(&source, "texte du programme");

        let organizer = Organizer::new(out.path());
        let file = organizer.organize(&source).unwrap();

        let expected = out
            .path()
            .join("lycee/premiere/generale/histoire-g-ographie/programme-de-premi-re-g-n-rale.txt");
        assert_eq!(file.target, expected);
        assert_eq!(std::fs::read_to_string(&expected).unwrap(), "texte du programme");
        assert_eq!(file.record.matiere, "Histoire_g_ographie");
    }

    #[test]
    fn organize_overwrites_and_keeps_mtime() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let source = src.path().join("cycle1").join("ensel135_annexe1.txt");
        write(&source, "v2");

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let target = out.path().join("primaire/cycle1/cycle1/ensel135-annexe1.txt");
        write(&target, "v1 with more bytes");

        Organizer::new(out.path()).organize(&source).unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "v2");
        let copied = std::fs::metadata(&target).unwrap().modified().unwrap();
        assert_eq!(copied, old);
    }

    #[test]
    fn organize_tree_only_takes_text_files() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(&src.path().join("cycle4/ensel714_annexe3.txt"), "c4");
        write(&src.path().join("Math_matiques/Programme_de_seconde.txt"), "m2");
        write(&src.path().join("Math_matiques/Programme_de_seconde.pdf"), "%PDF");
        write(&src.path().join("notes.md"), "ignored");

        let report = Organizer::new(out.path())
            .organize_tree(src.path(), &SilentProgress)
            .unwrap();

        assert_eq!(report.organized, 2);
        assert_eq!(report.failed, 0);
        assert!(out.path().join("college/5-4-3/cycle4/ensel714-annexe3.txt").is_file());
        assert!(
            out.path()
                .join("lycee/seconde/general-techno/math-matiques/programme-de-seconde.txt")
                .is_file()
        );
    }

    #[test]
    fn organize_tree_is_idempotent() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(&src.path().join("SES/terminale_technologique.txt"), "t");

        let organizer = Organizer::new(out.path());
        let first = organizer.organize_tree(src.path(), &SilentProgress).unwrap();
        let second = organizer.organize_tree(src.path(), &SilentProgress).unwrap();
        assert_eq!(first.organized, 1);
        assert_eq!(second.organized, 1);

        let files: Vec<_> = WalkDir::new(out.path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn target_nested_in_source_survives_reruns() {
        let src = tempfile::tempdir().unwrap();
        write(&src.path().join("maths/x.txt"), "contenu");
        let out = src.path().join("zz_out");

        let organizer = Organizer::new(&out);
        let first = organizer.organize_tree(src.path(), &SilentProgress).unwrap();
        let second = organizer.organize_tree(src.path(), &SilentProgress).unwrap();

        assert_eq!((first.organized, first.failed), (1, 0));
        assert_eq!((second.organized, second.failed), (1, 0));
        let copy = out.join("lycee/all/all/maths/x.txt");
        assert_eq!(std::fs::read_to_string(copy).unwrap(), "contenu");
    }

    #[test]
    fn organizing_a_file_onto_itself_is_refused() {
        let out = tempfile::tempdir().unwrap();
        let placed = out.path().join("lycee/all/all/maths/x.txt");
        write(&placed, "contenu");

        let err = Organizer::new(out.path()).organize(&placed).unwrap_err();

        assert!(err.to_string().contains("same file"));
        assert_eq!(std::fs::read_to_string(&placed).unwrap(), "contenu");
    }

    #[test]
    fn custom_classifier_drives_placement() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let source = src.path().join("Gestion").join("bts_annee_1.txt");
        write(&source, "bts");

        let mut classifier = Classifier::standard();
        classifier.insert_grade_rule(
            0,
            GradeRule {
                name: "bts",
                keywords: Matcher::AnyOf(&["bts"]),
                classe: "bts",
                track: TrackPolicy::Fixed("professionnel"),
            },
        );

        let file = Organizer::new(out.path())
            .with_classifier(classifier)
            .organize(&source)
            .unwrap();

        assert_eq!(
            file.target,
            out.path().join("lycee/bts/professionnel/gestion/bts-annee-1.txt")
        );
    }

    #[test]
    fn missing_source_dir_is_an_error() {
        let out = tempfile::tempdir().unwrap();
        let err = Organizer::new(out.path())
            .organize_tree(&out.path().join("absent"), &SilentProgress)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
