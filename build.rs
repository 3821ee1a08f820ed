// Stages `static/` into `dist/` so the site can be served without the source tree.
use std::{env, fs, path::Path};

use fs_extra::dir::{copy, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    let manifest = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
    let root = Path::new(&manifest);
    let static_dir = root.join("static");
    let out_dir = root.join("dist");

    if !static_dir.exists() {
        println!("cargo:warning=no static/ directory – nothing to stage");
        return;
    }
    if out_dir.exists() {
        fs::remove_dir_all(&out_dir).ok();
    }
    if let Err(err) = fs::create_dir_all(&out_dir) {
        println!("cargo:warning=cannot create dist/: {err}");
        return;
    }

    let options = CopyOptions::new().overwrite(true).content_only(true);
    if let Err(err) = copy(&static_dir, &out_dir, &options) {
        println!("cargo:warning=copying static/ to dist/ failed: {err}");
    }
}
