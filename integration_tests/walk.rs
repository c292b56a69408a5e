use assets::DirEntry;

fn main() {
    let mut files = 0;
    let mut dirs = 0;

    for entry in assets::ASSETS.walk() {
        println!("{}", entry.name());

        match entry {
            DirEntry::Dir(_) => dirs += 1,
            DirEntry::File(_) => files += 1,
        }
    }

    assert!(files > 0, "walking the default root should visit files");
    println!("walked {files} files and {dirs} directories");
}

mod assets {
    include!(concat!(env!("OUT_DIR"), "/assets.rs"));
}
