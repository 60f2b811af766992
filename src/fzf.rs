use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

use crate::git::BranchCandidate;
use crate::locale::Localizer;
use crate::markup::{decorate, strip_markup};
use crate::select::{SelectError, Selection, Selector, resolve_chosen};

/// fzf exit code when nothing matched the query.
const EXIT_NO_MATCH: i32 = 1;
/// fzf exit code on Ctrl-C or Esc.
const EXIT_INTERRUPTED: i32 = 130;

/// Feeds candidates to an fzf process and reads back the chosen lines.
///
/// Each input line is `<name>\t<decorated>`. fzf only displays the second
/// field, and hands the first to the preview command as `{1}`.
pub struct FzfSelector<'a> {
    program: PathBuf,
    preview_command: String,
    localizer: &'a Localizer,
}

impl<'a> FzfSelector<'a> {
    /// `exe` is this program's own path and `workdir` the repository the
    /// preview should read from.
    pub fn new(program: PathBuf, exe: &Path, workdir: &Path, localizer: &'a Localizer) -> Self {
        Self {
            program,
            preview_command: preview_command(exe, workdir),
            localizer,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["--multi", "--ansi", "--no-sort", "--layout=reverse"])
            .args(["--delimiter", "\t", "--with-nth", "2.."])
            .arg("--header")
            .arg(self.localizer.tr("SelectBranchesToDelete"))
            .arg("--preview")
            .arg(&self.preview_command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped());
        command
    }
}

impl Selector for FzfSelector<'_> {
    fn select(&mut self, candidates: &[BranchCandidate]) -> Result<Selection, SelectError> {
        let input = render_input(candidates, &self.localizer.tr("Merged"));

        let mut child = self
            .command()
            .spawn()
            .map_err(|source| SelectError::Unavailable {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("selector stdin was not captured"))?;

        // Fill the pipe from another thread so a large list cannot block us
        // while fzf is waiting for its output to be drained.
        let producer = thread::spawn(move || -> io::Result<()> {
            stdin.write_all(input.as_bytes())?;
            stdin.flush()
        });

        let output = child.wait_with_output()?;

        match producer.join() {
            Ok(Ok(())) => {}
            // fzf may exit before reading everything (e.g. --select-1).
            Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(err)) => warn!(error = %err, "writing candidates to selector failed"),
            Err(_) => warn!("selector input thread panicked"),
        }

        debug!(status = %output.status, "selector finished");

        match output.status.code() {
            Some(0) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                Ok(Selection::Chosen(resolve_chosen(
                    candidates,
                    parse_output(&stdout),
                )))
            }
            Some(EXIT_NO_MATCH) => Ok(Selection::Chosen(Vec::new())),
            Some(EXIT_INTERRUPTED) => Ok(Selection::Cancelled),
            code => Err(SelectError::Failed {
                program: self.program.clone(),
                code,
            }),
        }
    }
}

fn render_input(candidates: &[BranchCandidate], merged_label: &str) -> String {
    candidates
        .iter()
        .map(|candidate| format!("{}\t{}\n", candidate.name, decorate(candidate, merged_label)))
        .collect()
}

/// Bare branch names from fzf's output, one per selected line.
fn parse_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(|line| line.split('\t').next().unwrap_or(line))
        .map(strip_markup)
        .filter(|name| !name.is_empty())
        .collect()
}

fn preview_command(exe: &Path, workdir: &Path) -> String {
    format!(
        "{} --repo {} --preview-branch {{1}}",
        shell_quote(&exe.to_string_lossy()),
        shell_quote(&workdir.to_string_lossy())
    )
}

/// Single-quotes `value` for a POSIX shell.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Language;

    fn candidates() -> Vec<BranchCandidate> {
        vec![
            BranchCandidate {
                name: "feature-a".into(),
                merged: true,
            },
            BranchCandidate {
                name: "feature-b".into(),
                merged: false,
            },
        ]
    }

    #[test]
    fn input_lines_carry_bare_name_first() {
        let input = render_input(&candidates(), "merged");
        let names: Vec<_> = input
            .lines()
            .map(|line| line.split('\t').next().unwrap())
            .collect();
        assert_eq!(names, vec!["feature-a", "feature-b"]);
        assert!(input.lines().next().unwrap().contains("merged"));
    }

    #[test]
    fn output_lines_reduce_to_names() {
        let stdout = "feature-b\t\x1b[33mfeature-b\x1b[39m\n\x1b[32mfeature-a\x1b[0m (merged)\n\n";
        assert_eq!(parse_output(stdout), vec!["feature-b", "feature-a"]);
    }

    #[test]
    fn quotes_paths_for_the_shell() {
        assert_eq!(shell_quote("/opt/my tools/bin"), "'/opt/my tools/bin'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(
            preview_command(Path::new("/bin/x"), Path::new("/repo")),
            "'/bin/x' --repo '/repo' --preview-branch {1}"
        );
    }

    #[test]
    fn missing_program_is_unavailable() {
        let localizer = Localizer::for_language(Language::English).unwrap();
        let mut selector = FzfSelector::new(
            PathBuf::from("/nonexistent/fzf-for-tests"),
            Path::new("/bin/true"),
            Path::new("."),
            &localizer,
        );
        let err = selector.select(&candidates()).unwrap_err();
        assert!(matches!(err, SelectError::Unavailable { .. }));
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        /// Writes an executable shell script standing in for fzf.
        fn fake_fzf(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("fake-fzf");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn select_with(body: &str, candidates: &[BranchCandidate]) -> Result<Selection, SelectError> {
            let dir = TempDir::new().unwrap();
            let program = fake_fzf(&dir, body);
            let localizer = Localizer::for_language(Language::English).unwrap();
            let mut selector =
                FzfSelector::new(program, Path::new("/bin/true"), dir.path(), &localizer);
            // A concurrently forked test can briefly hold the script open for
            // writing, which makes exec fail with ETXTBSY.
            for _ in 0..20 {
                match selector.select(candidates) {
                    Err(SelectError::Unavailable { source, .. })
                        if source.raw_os_error() == Some(26) =>
                    {
                        std::thread::sleep(std::time::Duration::from_millis(50));
                    }
                    result => return result,
                }
            }
            selector.select(candidates)
        }

        #[test]
        fn echoed_lines_become_the_selection() {
            let selection = select_with("cat", &candidates()).unwrap();
            assert_eq!(selection, Selection::Chosen(candidates()));
        }

        #[test]
        fn large_lists_do_not_deadlock() {
            let many: Vec<_> = (0..20_000)
                .map(|i| BranchCandidate {
                    name: format!("topic/{i:05}"),
                    merged: i % 2 == 0,
                })
                .collect();
            let selection = select_with("tail -n 1", &many).unwrap();
            assert_eq!(selection, Selection::Chosen(vec![many[19_999].clone()]));
        }

        #[test]
        fn interrupt_means_cancelled() {
            let selection = select_with("cat >/dev/null; exit 130", &candidates()).unwrap();
            assert_eq!(selection, Selection::Cancelled);
        }

        #[test]
        fn no_match_is_an_empty_selection() {
            let selection = select_with("cat >/dev/null; exit 1", &candidates()).unwrap();
            assert_eq!(selection, Selection::Chosen(Vec::new()));
        }

        #[test]
        fn other_exit_codes_are_failures() {
            let err = select_with("exit 2", &candidates()).unwrap_err();
            assert!(matches!(err, SelectError::Failed { code: Some(2), .. }));
        }
    }
}
