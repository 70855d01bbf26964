use std::{env, fs, path::PathBuf};

fn main() {
    let ld_script_folder = match env::var("LD_SCRIPT_FOLDER") {
        Ok(var) => PathBuf::from(var),
        _ => PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap()).join("src/bsp/raspberrypi"),
    };
    println!("cargo:rerun-if-env-changed=LD_SCRIPT_FOLDER");

    let files = fs::read_dir(&ld_script_folder).unwrap();
    files
        .filter_map(Result::ok)
        .filter(|d| {
            if let Some(e) = d.path().extension() {
                e == "ld"
            } else {
                false
            }
        })
        .for_each(|f| println!("cargo:rerun-if-changed={}", f.path().display()));

    // Only the bare-metal image is linked with the script.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("none") {
        println!(
            "cargo:rustc-link-arg-bins=--script={}",
            ld_script_folder.join("kernel.ld").display()
        );
    }
}
