#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Slice of a generated classes index, including multi-target and escaped keys.
pub const CLASSES_D: &str = r#"var searchData=
[
  ['databaseshard_14073',['DatabaseShard',['../classripple_1_1NodeStore_1_1DatabaseShard.html',1,'ripple::NodeStore']]],
  ['databaseshard_5ftest_14074',['DatabaseShard_test',['../classripple_1_1NodeStore_1_1DatabaseShard__test.html',1,'ripple::NodeStore']]],
  ['dbconfig_14076',['DBConfig',['../classripple_1_1DBConfig.html',1,'ripple']]],
  ['decay_14079',['decay',['http://en.cppreference.com/w/cpp/types/decay.html',1,'std']]],
  ['decay_5ft_14080',['decay_t',['http://en.cppreference.com/w/cpp/types/decay.html',1,'std']]],
  ['decaywindow_3c_2030_2c_20clock_5ftype_20_3e_14084',['DecayWindow&lt; 30, clock_type &gt;',['../classripple_1_1DecayWindow.html',1,'ripple']]],
  ['default_5fsearcher_14089',['default_searcher',['http://en.cppreference.com/w/cpp/experimental/default_searcher.html',1,'std::experimental::default_searcher'],['http://en.cppreference.com/w/cpp/utility/functional/default_searcher.html',1,'std::default_searcher']]],
  ['deque_14102',['deque',['http://en.cppreference.com/w/cpp/container/deque.html',1,'std::pmr::deque'],['http://en.cppreference.com/w/cpp/container/deque.html',1,'std::deque&lt; T &gt;']]],
  ['deque_3c_20errorinfo_20_3e_14103',['deque&lt; ErrorInfo &gt;',['http://en.cppreference.com/w/cpp/container/deque.html',1,'std']]],
  ['duration_14161',['duration',['http://en.cppreference.com/w/cpp/chrono/duration.html',1,'std::chrono']]]
];
"#;

pub const CLASSES_E: &str = r#"var searchData=
[
  ['entry_14170',['Entry',['../structripple_1_1Entry.html',1,'ripple']]]
];
"#;

pub const FUNCTIONS_D: &str = r#"var searchData=
[
  ['decode_20001',['decode',['../namespaceripple.html#a1',1,'ripple']]]
];
"#;

pub const SEARCHDATA: &str = r#"var indexSectionsWithContent =
{
  0: "de",
  1: "de"
};
"#;

// Temporary generated-docs tree: `<root>/html/search/*.js`.
pub struct DocsTree {
    pub temp: TempDir,
}

impl DocsTree {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("creating temp docs tree")?;
        fs::create_dir_all(temp.path().join("html/search"))?;
        Ok(Self { temp })
    }

    pub fn with_default_index() -> Result<Self> {
        let tree = Self::new()?;
        tree.write("classes_0.js", CLASSES_D)?;
        tree.write("classes_1.js", CLASSES_E)?;
        tree.write("functions_0.js", FUNCTIONS_D)?;
        tree.write("searchdata.js", SEARCHDATA)?;
        Ok(tree)
    }

    pub fn html_root(&self) -> PathBuf {
        self.temp.path().join("html")
    }

    pub fn search_dir(&self) -> PathBuf {
        self.html_root().join("search")
    }

    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.search_dir().join(name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd.output().context("failed to spawn command")?;
    if !output.status.success() {
        anyhow::bail!(
            "command {:?} failed: {}\nstderr: {}",
            cmd,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}
