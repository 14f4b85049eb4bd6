use std::path::Path;

/// Renders one file as a `### File:` header followed by its raw content in a
/// fenced block.
pub fn file_section(path: &Path, content: &str) -> String {
    let fence = fence_for(content);
    format!(
        "\n\n### File: {}\n\n{fence}\n{content}\n{fence}\n\n",
        path.display()
    )
}

// One backtick longer than any run inside the content, so the block can't be
// closed early. Content is never altered.
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}

/// Wraps already rendered file sections in the documentation request.
///
/// `single_file` reflects the whole run, not the current batch.
pub fn build_prompt<I, S>(sections: I, single_file: bool) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let content: String = sections.into_iter().map(|s| s.as_ref().to_owned()).collect();
    let (scope, noun) = if single_file {
        ("a single file", "file")
    } else {
        ("a multi-file project", "project")
    };

    format!(
        r#"You are an experienced senior developer tasked with creating comprehensive and detailed documentation for {scope} within a software repository. The documentation should be exhaustive, covering every relevant detail that another developer or team might need to understand, maintain, or extend the codebase. Follow best practices in technical writing: be clear, precise and accessible.

**Project Overview:**
- Provide a high-level summary of the purpose and functionality of the {noun}.
- Explain the context in which this {noun} would typically be used.
- Identify the main technologies and frameworks utilized.
- Highlight any design patterns or architectural principles followed.

**File Information (for each file):**
- File Name:
- Full Path:
- Programming Language(s) (if identifiable):
- General Description:
  - What is the overall purpose of this file?
  - What specific problems does it solve, and how does it fit into the larger codebase?
- Dependencies and External Modules:
  - List any external libraries or modules used, with a brief description of their purpose.
  - Include version information if applicable.

**Code Structure and Flow:**
- Provide a detailed outline of the code structure.
- Break down the file into its main components (functions, classes, modules).
- For each component, include:
  - Name and location in the code.
  - Detailed description of its purpose and functionality.
  - Input Parameters: name, type and description for each parameter.
  - Return Values: type and description of the return value.
  - Example Usage: code snippets demonstrating typical use cases.
  - Edge Cases: potential edge cases or unusual scenarios the code handles.
  - Performance Considerations: known performance characteristics and bottlenecks.
  - Error Handling: how errors are managed, with example messages and strategies.

**In-depth Analysis:**
- Complex Algorithms and Business Logic: step-by-step explanation, pseudo-code if necessary, the rationale behind the choices, diagrams if applicable.
- Security Considerations: measures implemented, potential vulnerabilities and their mitigation.
- Testing Strategies: how the code can be tested, examples of unit, integration and end-to-end tests, known gaps in coverage.

**Code Quality and Best Practices:**
- Identify any coding standards or best practices followed.
- Point out areas that could be refactored or improved, with suggestions.
- Comment on readability, maintainability and scalability.

**Future Development and Maintenance:**
- Suggest areas for future development or enhancement.
- Explain how to extend or modify the existing codebase.
- Document known issues or technical debt, with recommendations.

**Source Code:**
{content}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_section_layout() {
        let section = file_section(Path::new("src/a.txt"), "hello");
        assert_eq!(section, "\n\n### File: src/a.txt\n\n```\nhello\n```\n\n");
    }

    #[test]
    fn test_fence_grows_past_content_backticks() {
        let content = "intro\n```rust\nfn main() {}\n```\n";
        let section = file_section(Path::new("README.md"), content);
        assert!(section.contains("\n````\nintro\n```rust"));
        assert!(section.ends_with("\n````\n\n"));
        // content itself is untouched
        assert!(section.contains(content));
    }

    #[test]
    fn test_single_file_wording() {
        let prompt = build_prompt([file_section(Path::new("a.txt"), "hello")], true);
        assert!(prompt.contains("for a single file within"));
        assert!(prompt.contains("functionality of the file."));
        assert!(!prompt.contains("multi-file project"));
        assert!(prompt.ends_with("**Source Code:**\n\n\n### File: a.txt\n\n```\nhello\n```\n\n"));
    }

    #[test]
    fn test_project_wording_keeps_section_order() {
        let sections = [
            file_section(Path::new("x"), "first"),
            file_section(Path::new("y"), "second"),
        ];
        let prompt = build_prompt(&sections, false);
        assert!(prompt.contains("for a multi-file project within"));
        assert!(prompt.contains("this project would typically be used"));

        let x = prompt.find("### File: x").unwrap();
        let y = prompt.find("### File: y").unwrap();
        assert!(x < y);
    }
}
