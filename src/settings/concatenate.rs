//! Concatenate (row union): static defaults only.

use super::Config;

pub fn fill(model: &mut Config) {
    model
        .boolean("create_new_rowids", true)
        .boolean("fail_on_duplicates", false)
        .boolean("append_suffix", false)
        .boolean("intersection_of_columns", false)
        .string("suffix", "_dup")
        .boolean("enable_hiliting", false);
}
