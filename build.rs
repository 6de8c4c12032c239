// build.rs

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Only the Xlib backend needs native libraries. The core and the mock
    // backend build without any windowing system installed.
    if std::env::var_os("CARGO_FEATURE_X11").is_none() {
        return;
    }

    // Try pkg-config first, which is the standard way to find library
    // linking information on Unix-like systems.
    if let Err(e) = pkg_config::probe_library("x11") {
        eprintln!(
            "pkg-config failed for library 'x11' ({}). Falling back to manual linking.",
            e
        );

        // --- Manual Linking Fallback ---
        // Assumes libX11 lives in a standard path such as /usr/lib.
        println!("cargo:rustc-link-lib=X11");
        println!("cargo:rustc-link-search=/usr/lib");
        eprintln!("Manual linking flags applied. Ensure the X11 development library is installed.");
    } else {
        eprintln!("pkg-config successfully found libX11. Linking configured automatically.");
    }
}
