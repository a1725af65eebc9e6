//! Context builder — the system prompt sent with every request.

use std::path::Path;

/// Build the system prompt for a session rooted at `cwd`.
pub fn build_system_prompt(cwd: &Path) -> String {
    format!(
        "You are Code Agent, a terminal-based coding assistant.\n\n\
         Rules:\n\
         - Use tools to inspect files instead of guessing.\n\
         - Use edit only when the target string is known and stable.\n\
         - Prefer small, incremental changes.\n\
         - Do not fabricate file contents.\n\
         - Current working directory: {cwd}",
        cwd = cwd.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_system_prompt() {
        let prompt = build_system_prompt(Path::new("/tmp/project"));
        assert!(prompt.starts_with("You are Code Agent"));
        assert!(prompt.ends_with("Current working directory: /tmp/project"));
        assert!(prompt.contains("- Use tools to inspect files instead of guessing."));
    }
}
