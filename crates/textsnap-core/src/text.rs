use unicode_normalization::UnicodeNormalization;

pub trait TextCleaner {
    // Default cleanup for recognizer output
    fn clean(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Unicode normalization (NFKC) folds ligatures and full-width forms
        let text: String = text.nfkc().collect();

        text.replace("\r\n", "\n")
            .replace('\r', "\n")
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct DefaultTextCleaner;
impl TextCleaner for DefaultTextCleaner {}
