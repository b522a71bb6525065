fn main() {
    #[cfg(feature = "native")]
    native::configure();
}

/// Locate librealsense and compile the `rsutil.h` shim.
///
/// `REALSENSE_DIR` names an install prefix (`include/` and `lib/` below it);
/// `REALSENSE_INCLUDE_DIR` and `REALSENSE_LIB_DIR` override either half.
/// Without them, pkg-config is asked for `realsense`.
#[cfg(feature = "native")]
mod native {
    use std::env;
    use std::path::PathBuf;

    fn env_path(name: &str) -> Option<PathBuf> {
        println!("cargo:rerun-if-env-changed={}", name);
        env::var_os(name).map(PathBuf::from)
    }

    pub fn configure() {
        println!("cargo:rerun-if-changed=csrc/rsutil_shim.c");

        let prefix = env_path("REALSENSE_DIR");
        let include_dir = env_path("REALSENSE_INCLUDE_DIR")
            .or_else(|| prefix.as_ref().map(|p| p.join("include")));
        let lib_dir =
            env_path("REALSENSE_LIB_DIR").or_else(|| prefix.as_ref().map(|p| p.join("lib")));

        let mut include_paths: Vec<PathBuf> = include_dir.into_iter().collect();

        match lib_dir {
            Some(lib) => println!("cargo:rustc-link-search=native={}", lib.display()),
            None => match pkg_config::Config::new().probe("realsense") {
                Ok(library) => include_paths.extend(library.include_paths),
                Err(e) => println!(
                    "cargo:warning=realsense not found by pkg-config ({}), using default paths",
                    e
                ),
            },
        }

        cc::Build::new()
            .file("csrc/rsutil_shim.c")
            .includes(&include_paths)
            .compile("realsense_rsutil_shim");
    }
}
