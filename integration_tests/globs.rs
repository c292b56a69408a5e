// FEATURE: globs
// IGNORE: .git target

extern crate glob;

fn main() {
    let rust_files: Vec<_> = assets::ASSETS.glob("*.rs").unwrap().collect();
    assert!(
        !rust_files.is_empty(),
        "the embedded source tree should contain rust files"
    );

    for file in rust_files {
        println!("{}", file.path().display());
    }

    let lib_star: Vec<_> = assets::ASSETS.glob("lib.*").unwrap().collect();
    assert_eq!(lib_star.len(), 1);
}

#[allow(dead_code)]
mod assets {
    include!(concat!(env!("OUT_DIR"), "/assets.rs"));
}
