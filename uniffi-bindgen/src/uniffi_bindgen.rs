//! Thin wrapper around the `uniffi` CLI used to generate the Swift and
//! Kotlin bindings for `sesame-core`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
