//! Temporary C# solutions for integration tests

use std::fs;
use std::path::{Path, PathBuf};

use solution_metrics::Solution;
use tempfile::TempDir;

const CSHARP_PROJECT_TYPE: &str = "FAE04EC0-301F-11D3-BF4B-00C04F79EFBC";

/// A solution laid out in a temporary directory.
///
/// Projects live in `<root>/<name>/<name>.csproj`. The manifest lists them
/// with Windows-style separators, as Visual Studio writes them.
pub struct TestSolution {
    dir: TempDir,
    name: String,
    /// `(name, directory relative to the root)`
    projects: Vec<(String, String)>,
}

impl TestSolution {
    pub fn new(name: &str) -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
            name: name.to_string(),
            projects: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add an empty project in `<root>/<name>`
    pub fn with_project(self, name: &str) -> Self {
        self.with_project_in(name, name)
    }

    /// Add an empty project in a directory relative to the root, which may
    /// sit inside another project
    pub fn with_project_in(mut self, name: &str, dir: &str) -> Self {
        let project_dir = self.dir.path().join(dir);
        fs::create_dir_all(&project_dir).expect("create project dir");
        fs::write(
            project_dir.join(format!("{name}.csproj")),
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n</Project>\n",
        )
        .expect("write project file");
        self.projects.push((name.to_string(), dir.to_string()));
        self
    }

    /// Add a source file under a project directory, creating directories as needed
    pub fn with_file(self, project: &str, relative: &str, contents: &str) -> Self {
        self.with_bytes(project, relative, contents.as_bytes())
    }

    /// Add a source file with raw, possibly non-UTF-8, contents
    pub fn with_bytes(self, project: &str, relative: &str, contents: &[u8]) -> Self {
        let path = self.file_path(project, relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create source dir");
        }
        fs::write(&path, contents).expect("write source file");
        self
    }

    pub fn file_path(&self, project: &str, relative: &str) -> PathBuf {
        self.dir.path().join(project).join(relative)
    }

    pub fn file_display(&self, project: &str, relative: &str) -> String {
        self.file_path(project, relative).display().to_string()
    }

    /// Write the `.sln` manifest and return its path
    pub fn write_manifest(&self) -> PathBuf {
        let mut text = String::from(
            "\nMicrosoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio Version 17\n",
        );
        for (index, (project, dir)) in self.projects.iter().enumerate() {
            let dir = dir.replace('/', "\\");
            text.push_str(&format!(
                "Project(\"{{{CSHARP_PROJECT_TYPE}}}\") = \"{project}\", \"{dir}\\{project}.csproj\", \"{{00000000-0000-0000-0000-{index:012}}}\"\nEndProject\n"
            ));
        }
        text.push_str("Global\nEndGlobal\n");

        let path = self.dir.path().join(format!("{}.sln", self.name));
        fs::write(&path, text).expect("write manifest");
        path
    }

    /// Write the manifest and load it
    pub fn load(&self) -> Solution {
        Solution::from_manifest(self.write_manifest()).expect("load solution")
    }
}
