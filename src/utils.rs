//! Small text helpers shared by the catalog and synonym writers.

/// Replace line breaks with spaces so a value stays on one output line.
pub fn single_line<T: AsRef<str>>(text: T) -> String {
    text.as_ref().replace(['\n', '\r'], " ")
}

/// Replace spaces with underscores so a display name can serve as a label token.
pub fn label_token<T: AsRef<str>>(name: T) -> String {
    name.as_ref().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_replaces_each_break_with_a_space() {
        assert_eq!(single_line("Alpha\nBeta\r\nGamma"), "Alpha Beta  Gamma");
        assert_eq!(single_line("unchanged"), "unchanged");
    }

    #[test]
    fn label_token_underscores_spaces() {
        assert_eq!(label_token("All Flat-Panel TVs"), "All_Flat-Panel_TVs");
    }
}
