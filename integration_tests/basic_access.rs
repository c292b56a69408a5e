//! Checks the basic accessors on the embedded tree: names, paths, file
//! contents, and total size.

fn main() {
    println!("asset directory: {}", assets::ASSETS.name());

    for file in assets::ASSETS.files {
        println!(
            "\t{} at {} ({} bytes)",
            file.name(),
            file.path().display(),
            file.contents.len()
        );
    }

    for dir in assets::ASSETS.subdirs {
        println!("\t{}", dir.path().display());
    }

    println!("asset directory contains {} bytes", assets::ASSETS.size());
}

#[allow(dead_code, unused_variables)]
mod assets {
    include!(concat!(env!("OUT_DIR"), "/assets.rs"));
}
