use flameview_core::model::{CallTree, FlameFrame, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollapsedParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("no valid stack lines found")]
    Empty,
    #[error("call tree: {0}")]
    Tree(#[from] TreeError),
}

/// Parse Brendan Gregg's collapsed/folded stack format into a call tree.
///
/// Each line is `frame;frame;... count`, outermost frame first, with the
/// sample count as the last whitespace-separated token. Frames are either
/// `function (file:line)` as written by py-spy, or a bare `function`.
/// Stacks sharing a prefix merge; siblings keep the order in which they were
/// first seen.
pub fn parse_collapsed(data: &[u8]) -> Result<CallTree, CollapsedParseError> {
    let text = std::str::from_utf8(data)?;
    let mut tree = CallTree::new();
    let mut stacks = 0usize;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Split into stack and count: "a;b;c 42"
        let Some((stack, count)) = line.rsplit_once(char::is_whitespace) else {
            tracing::warn!(line = lineno + 1, "stack line without a sample count");
            continue;
        };
        let Ok(count) = count.parse::<u32>() else {
            tracing::warn!(line = lineno + 1, count, "invalid sample count");
            continue;
        };
        let frames: Vec<FlameFrame> = stack
            .split(';')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(parse_frame)
            .collect();
        if frames.is_empty() {
            continue;
        }

        tree.add_stack(frames, count)?;
        stacks += 1;
    }

    if tree.is_empty() {
        return Err(CollapsedParseError::Empty);
    }
    tracing::debug!(
        stacks,
        samples = tree.total_width(),
        depth = tree.max_depth(),
        frames = tree.frames().len(),
        "parsed collapsed stacks"
    );
    Ok(tree)
}

/// `function (file:line)`, `function (file)` or `function`.
fn parse_frame(text: &str) -> FlameFrame {
    let located = text
        .strip_suffix(')')
        .and_then(|rest| rest.rsplit_once(" ("));
    let Some((function, location)) = located else {
        return FlameFrame::new("", text, 0);
    };
    match location.rsplit_once(':') {
        Some((file, line)) => match line.parse() {
            Ok(line) => FlameFrame::new(file, function, line),
            Err(_) => FlameFrame::new(location, function, 0),
        },
        None => FlameFrame::new(location, function, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &CallTree, ids: &[flameview_core::model::NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|&id| tree.node(id))
            .filter_map(|n| n.frame.frame_id())
            .filter_map(|fid| tree.frame(fid))
            .map(|f| f.function.to_string())
            .collect()
    }

    #[test]
    fn parse_basic_collapsed() {
        let input = b"main;foo;bar 10\nmain;foo;baz 20\nmain;qux 5\n";
        let tree = parse_collapsed(input).unwrap();
        assert_eq!(tree.total_width(), 35);
        assert_eq!(tree.max_depth(), 3);
        assert_eq!(names(&tree, &tree.root().children), vec!["main"]);

        let main = tree.root().children[0];
        let main_node = tree.node(main).unwrap();
        assert_eq!(main_node.width, 35);
        assert_eq!(names(&tree, &main_node.children), vec!["foo", "qux"]);
    }

    #[test]
    fn parses_py_spy_locations() {
        let input = b"<module> (app.py:3);run (lib/core.py:120) 4\n";
        let tree = parse_collapsed(input).unwrap();
        let run = tree
            .frames()
            .iter()
            .find(|f| f.function.as_ref() == "run")
            .unwrap();
        assert_eq!(run.file.as_ref(), "lib/core.py");
        assert_eq!(run.line, 120);
        assert_eq!(run.label(), "core.py, run: line 120");
    }

    #[test]
    fn frame_forms() {
        let f = parse_frame("main");
        assert_eq!((f.file.as_ref(), f.function.as_ref(), f.line), ("", "main", 0));
        let f = parse_frame("load (C:\\src\\x.py:9)");
        assert_eq!((f.file.as_ref(), f.function.as_ref(), f.line), ("C:\\src\\x.py", "load", 9));
        let f = parse_frame("go (gen.py)");
        assert_eq!((f.file.as_ref(), f.line), ("gen.py", 0));
        let f = parse_frame("anon (x.js:eval)");
        assert_eq!((f.file.as_ref(), f.line), ("x.js:eval", 0));
    }

    #[test]
    fn skips_comments_and_bad_lines() {
        let input = b"# comment\n\nmain;foo 5\nno-count\nmain;foo lots\n";
        let tree = parse_collapsed(input).unwrap();
        assert_eq!(tree.total_width(), 5);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn empty_input_errors() {
        assert!(matches!(parse_collapsed(b""), Err(CollapsedParseError::Empty)));
        assert!(matches!(parse_collapsed(b"main 0\n"), Err(CollapsedParseError::Empty)));
        assert!(matches!(
            parse_collapsed(&[0xff, 0xfe]),
            Err(CollapsedParseError::Utf8(_))
        ));
    }
}
