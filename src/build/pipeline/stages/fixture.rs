//! Sample documentation project shared by stage tests.

use std::path::Path;

use tempfile::TempDir;

use crate::config::{Config, Overrides, Settings};

/// A project tree on disk with two configured document types (`manual`,
/// `articles`) and one unconfigured type (`drafts`).
pub struct Project {
    pub dir: TempDir,
    pub settings: Settings,
}

pub const DATE: &str = "October 19, 2026";
pub const VERSION: &str = "2.5.0";

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write(root, "docs/manual/guide.md", "# Guide\n\n![d](images/diagram.png)\n");
        write(root, "docs/manual/images/diagram.png", "png-diagram");
        write(root, "docs/articles/intro.md", "# Intro\n");
        write(root, "docs/articles/images/photo.png", "png-photo");
        write(root, "docs/drafts/scratch.md", "# Scratch\n");
        write(root, "docs/images/shared.png", "png-shared");
        write(root, "docs/notes.txt", "not a type directory");

        write(root, "scripts/app.js", "console.log('app');\n");
        write(root, "styles/base.css", "body { margin: 0; }\n");
        write(root, "styles/theme.less", "@c: #333; body { color: @c; }\n");

        write(
            root,
            "templates/manual.html",
            "<html><!-- analytics --><script>track();</script>\n<footer>@VERSION@ | @DATE@</footer>$body$</html>\n",
        );
        write(root, "templates/articles.html", "<html>$body$ @DATE@</html>\n");
        write(root, "templates/manual.epub.html", "<html>$body$ v@VERSION@</html>\n");
        std::fs::write(root.join("templates/cover.bin"), [0xff_u8, 0xfe, 0x40, 0x00]).unwrap();

        let mut config = Config::starter("guide");
        config.project.version = VERSION.to_string();
        config.project.date = Some(DATE.to_string());
        config.package.dir = "dist".into();
        let settings = Settings::resolve(&config, root, &Overrides::default()).unwrap();

        Self { dir, settings }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
