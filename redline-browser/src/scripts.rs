//! Page-side scripts for driving the diff view
//!
//! Each builder returns a self-contained IIFE evaluated in the page. Every
//! interpolated value is JSON-escaped before insertion, and every script
//! reports back a small status object rather than throwing, so the Rust
//! side can map outcomes onto the error taxonomy.
//!
//! The scripts lean on two techniques the diff view's framework forces:
//! activation walks the per-element component-instance chain to find the
//! internal press handler (the add-comment control only responds to that
//! path, not to synthetic pointer events), and editing writes through the
//! prototype value setter plus an input event (the framework shadow-tracks
//! input state and ignores plain assignments).

use redline_core::{DiffSide, DiffTarget};

/// JSON-escape a string for embedding in a script
fn js_str(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// The column attribute value for a diff side
fn side_attr(side: DiffSide) -> &'static str {
    match side {
        DiffSide::Original => "left",
        DiffSide::Revised => "right",
    }
}

/// Resolve a target to a row, expanding and tagging as needed
///
/// Status values: `ok`, `no_file`, `loading` (expansion clicked or still
/// hydrating; poll again), `not_found`, `ambiguous`.
pub(crate) fn locate(target: &DiffTarget, token: &str) -> String {
    const TEMPLATE: &str = r#"(() => {
  const file = __FILE__;
  const line = __LINE__;
  const side = __SIDE__;
  const token = __TOKEN__;

  const header = document.querySelector('.file-header[data-path=' + JSON.stringify(file) + ']');
  if (!header) return { status: 'no_file' };
  const container = header.closest('.file') || header.parentElement;
  if (!container) return { status: 'no_file' };

  const loader = container.querySelector('button.load-diff-button');
  if (loader) {
    loader.click();
    return { status: 'loading' };
  }
  if (!container.querySelector('table')) return { status: 'loading' };

  const cells = Array.from(container.querySelectorAll('td[data-line-number="' + line + '"]'));
  const matches = cells.filter((td) => {
    const split = td.closest('[data-split-side]');
    if (split) return split.getAttribute('data-split-side') === side;
    return (td.cellIndex === 0 ? 'left' : 'right') === side;
  });
  if (matches.length === 0) return { status: 'not_found' };
  if (matches.length > 1) return { status: 'ambiguous', count: matches.length };

  const row = matches[0].closest('tr');
  if (!row) return { status: 'not_found' };

  document
    .querySelectorAll('[data-redline-anchor="' + token + '"]')
    .forEach((el) => el.removeAttribute('data-redline-anchor'));
  row.setAttribute('data-redline-anchor', token);
  row.scrollIntoView({ block: 'center' });
  return { status: 'ok' };
})()"#;

    TEMPLATE
        .replace("__FILE__", &js_str(&target.file))
        .replace("__LINE__", &target.line.to_string())
        .replace("__SIDE__", &js_str(side_attr(target.side)))
        .replace("__TOKEN__", &js_str(token))
}

/// Open the per-line comment form through the internal press handler
///
/// Status values: `ok` (with `confirmed` when the secondary key handler
/// also fired), `no_anchor`, `no_handler`.
pub(crate) fn activate(token: &str) -> String {
    const TEMPLATE: &str = r#"(() => {
  const token = __TOKEN__;
  const row = document.querySelector('tr[data-redline-anchor="' + token + '"]');
  if (!row) return { status: 'no_anchor' };

  const start =
    row.querySelector('button.add-line-comment, button.js-add-line-comment') ||
    row.querySelector('td[data-line-number]') ||
    row;

  const fiberKey = Object.keys(start).find((k) => k.startsWith('__reactFiber$'));
  let node = fiberKey ? start[fiberKey] : null;
  let pressed = false;
  let confirmed = false;
  const event = {
    target: start,
    currentTarget: start,
    preventDefault() {},
    stopPropagation() {},
  };

  while (node) {
    const props = node.memoizedProps;
    const handler = props && (props.onPress || props.onClick);
    if (typeof handler === 'function') {
      handler(event);
      pressed = true;
      if (typeof props.onKeyDown === 'function') {
        props.onKeyDown(Object.assign({ key: 'Enter', code: 'Enter' }, event));
        confirmed = true;
      }
      break;
    }
    node = node.return;
  }

  if (!pressed) return { status: 'no_handler' };
  return { status: 'ok', confirmed };
})()"#;

    TEMPLATE.replace("__TOKEN__", &js_str(token))
}

/// Finder shared by the editor scripts: the comment form renders in a row
/// inserted just below the anchor row.
const FIND_TEXTAREA: &str = r#"
  const row = document.querySelector('tr[data-redline-anchor="' + token + '"]');
  if (!row) return { status: 'no_anchor' };
  let textarea = null;
  let sibling = row.nextElementSibling;
  for (let hops = 0; sibling && hops < 3 && !textarea; hops += 1) {
    textarea = sibling.querySelector('textarea[name="comment[body]"], textarea');
    sibling = sibling.nextElementSibling;
  }
  if (!textarea) textarea = row.querySelector('textarea');
"#;

/// Report whether a comment form is open for the row and what it holds
pub(crate) fn form_state(token: &str) -> String {
    let template = format!(
        r#"(() => {{
  const token = __TOKEN__;
{FIND_TEXTAREA}
  if (!textarea || textarea.disabled) return {{ status: 'ok', open: false, value: null }};
  return {{ status: 'ok', open: true, value: textarea.value }};
}})()"#
    );

    template.replace("__TOKEN__", &js_str(token))
}

/// Write the body through the framework's own state-update path
///
/// Status values: `ok` (with the live `value` readback), `no_anchor`,
/// `no_editor`.
pub(crate) fn write_body(token: &str, body: &str) -> String {
    let template = format!(
        r#"(() => {{
  const token = __TOKEN__;
  const body = __BODY__;
{FIND_TEXTAREA}
  if (!textarea || textarea.disabled) return {{ status: 'no_editor' }};

  const setter = Object.getOwnPropertyDescriptor(
    window.HTMLTextAreaElement.prototype,
    'value'
  ).set;
  setter.call(textarea, body);
  textarea.dispatchEvent(new Event('input', {{ bubbles: true }}));
  textarea.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return {{ status: 'ok', value: textarea.value }};
}})()"#
    );

    template
        .replace("__TOKEN__", &js_str(token))
        .replace("__BODY__", &js_str(body))
}

/// Press the start-review / add-to-review control on the open form
///
/// Status values: `ok`, `no_anchor`, `no_form`, `no_button`.
pub(crate) fn submit_annotation(token: &str, start_review: bool) -> String {
    let label = if start_review {
        "start a review"
    } else {
        "add review comment"
    };

    let template = format!(
        r#"(() => {{
  const token = __TOKEN__;
  const label = __LABEL__;
{FIND_TEXTAREA}
  if (!textarea) return {{ status: 'no_form' }};
  const form = textarea.closest('form');
  if (!form) return {{ status: 'no_form' }};

  const buttons = Array.from(form.querySelectorAll('button'));
  const button = buttons.find((b) =>
    (b.textContent || '').trim().toLowerCase().includes(label)
  );
  if (!button || button.disabled) return {{ status: 'no_button' }};
  button.click();
  return {{ status: 'ok' }};
}})()"#
    );

    template
        .replace("__TOKEN__", &js_str(token))
        .replace("__LABEL__", &js_str(label))
}

/// Report whether the placed annotation shows as pending under the row
pub(crate) fn annotation_pending(token: &str) -> String {
    const TEMPLATE: &str = r#"(() => {
  const token = __TOKEN__;
  const row = document.querySelector('tr[data-redline-anchor="' + token + '"]');
  if (!row) return { status: 'no_anchor' };

  let sibling = row.nextElementSibling;
  for (let hops = 0; sibling && hops < 4; hops += 1) {
    const comment = sibling.querySelector('.js-pending-review-comment, .review-comment');
    if (comment && /pending/i.test(comment.textContent || '')) {
      return { status: 'ok', pending: true };
    }
    sibling = sibling.nextElementSibling;
  }
  return { status: 'ok', pending: false };
})()"#;

    TEMPLATE.replace("__TOKEN__", &js_str(token))
}

/// Open the review-submission dialog
///
/// Status values: `ok`, `no_control`.
pub(crate) fn open_review_dialog() -> String {
    r#"(() => {
  const controls = Array.from(document.querySelectorAll('button, summary'));
  const toggle = controls.find((el) =>
    /review changes|finish your review/i.test((el.textContent || '').trim())
  );
  if (!toggle) return { status: 'no_control' };
  toggle.click();
  return { status: 'ok' };
})()"#
        .to_string()
}

/// Report whether the review dialog's summary field is on screen
pub(crate) fn review_dialog_ready() -> String {
    r#"(() => {
  const textarea = document.querySelector(
    'textarea[name="pull_request_review[body]"], form[action*="/reviews"] textarea'
  );
  return { status: 'ok', open: !!textarea };
})()"#
        .to_string()
}

/// Fill the summary, pick the verdict, and submit the review
///
/// `event` is the platform's review event value (`approve`, `comment`,
/// `reject`). Status values: `ok`, `no_dialog`, `no_verdict`, `no_button`.
pub(crate) fn submit_review(event: &str, summary: &str) -> String {
    const TEMPLATE: &str = r#"(() => {
  const summary = __SUMMARY__;
  const event = __EVENT__;

  const textarea = document.querySelector(
    'textarea[name="pull_request_review[body]"], form[action*="/reviews"] textarea'
  );
  if (!textarea) return { status: 'no_dialog' };
  const form = textarea.closest('form');
  if (!form) return { status: 'no_dialog' };

  const setter = Object.getOwnPropertyDescriptor(
    window.HTMLTextAreaElement.prototype,
    'value'
  ).set;
  setter.call(textarea, summary);
  textarea.dispatchEvent(new Event('input', { bubbles: true }));
  textarea.dispatchEvent(new Event('change', { bubbles: true }));

  const radio = form.querySelector('input[type="radio"][value="' + event + '"]');
  if (radio) {
    radio.click();
  } else if (event !== 'comment') {
    return { status: 'no_verdict' };
  }

  const buttons = Array.from(form.querySelectorAll('button'));
  const submit = buttons.find((b) => /submit review/i.test((b.textContent || '').trim()));
  if (!submit || submit.disabled) return { status: 'no_button' };
  submit.click();
  return { status: 'ok' };
})()"#;

    TEMPLATE
        .replace("__SUMMARY__", &js_str(summary))
        .replace("__EVENT__", &js_str(event))
}

/// Report whether the pending review is gone, i.e. the submission landed
pub(crate) fn review_submitted() -> String {
    r#"(() => {
  const banner = Array.from(document.querySelectorAll('button, summary')).find((el) =>
    /finish your review/i.test(el.textContent || '')
  );
  const pending = document.querySelectorAll('.js-pending-review-comment').length;
  return { status: 'ok', submitted: !banner && pending === 0 };
})()"#
        .to_string()
}

/// Report whether the files view has rendered at all
pub(crate) fn diff_ready() -> String {
    r#"(() => {
  const files = document.querySelector('#files, .js-diff-progressive-container');
  return { status: 'ok', ready: !!files };
})()"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_str_escapes_quotes_and_newlines() {
        let escaped = js_str("line \"one\"\nline two");
        assert_eq!(escaped, r#""line \"one\"\nline two""#);
    }

    #[test]
    fn test_locate_embeds_escaped_target() {
        let target = DiffTarget::revised("src/has \"quote\".rs", 42);
        let script = locate(&target, "a-1");
        assert!(script.contains(r#"const file = "src/has \"quote\".rs";"#));
        assert!(script.contains("const line = 42;"));
        assert!(script.contains(r#"const side = "right";"#));
        assert!(script.contains(r#"const token = "a-1";"#));
    }

    #[test]
    fn test_locate_side_mapping() {
        let script = locate(&DiffTarget::original("a.rs", 1), "t");
        assert!(script.contains(r#"const side = "left";"#));
    }

    #[test]
    fn test_write_body_escapes_multiline_markdown() {
        let body = "first line\n\n```rust\nlet x = \"y\";\n```";
        let script = write_body("t-2", body);
        // The body must arrive as one escaped JS string literal
        assert!(script.contains(r#"const body = "first line\n\n```rust\nlet x = \"y\";\n```";"#));
        assert!(script.contains("getOwnPropertyDescriptor"));
        assert!(script.contains("dispatchEvent"));
    }

    #[test]
    fn test_submit_annotation_labels() {
        let first = submit_annotation("t", true);
        assert!(first.contains(r#"const label = "start a review";"#));

        let later = submit_annotation("t", false);
        assert!(later.contains(r#"const label = "add review comment";"#));
    }

    #[test]
    fn test_submit_review_embeds_event_and_summary() {
        let script = submit_review("comment", "two minor notes");
        assert!(script.contains(r#"const event = "comment";"#));
        assert!(script.contains(r#"const summary = "two minor notes";"#));
    }

    #[test]
    fn test_scripts_are_iife() {
        for script in [
            locate(&DiffTarget::revised("a.rs", 1), "t"),
            activate("t"),
            form_state("t"),
            write_body("t", "b"),
            submit_annotation("t", true),
            annotation_pending("t"),
            open_review_dialog(),
            review_dialog_ready(),
            submit_review("approve", "s"),
            review_submitted(),
            diff_ready(),
        ] {
            assert!(script.starts_with("(() => {"), "not an IIFE: {script}");
            assert!(script.ends_with("})()"), "not an IIFE: {script}");
        }
    }

    #[test]
    fn test_no_unfilled_placeholders_remain() {
        let target = DiffTarget::revised("src/a.rs", 3);
        for script in [
            locate(&target, "t"),
            activate("t"),
            form_state("t"),
            write_body("t", "body"),
            submit_annotation("t", false),
            annotation_pending("t"),
            submit_review("approve", "ok"),
        ] {
            for placeholder in [
                "__FILE__", "__LINE__", "__SIDE__", "__TOKEN__", "__BODY__", "__LABEL__",
                "__EVENT__", "__SUMMARY__",
            ] {
                assert!(
                    !script.contains(placeholder),
                    "unfilled {placeholder} in: {script}"
                );
            }
        }
    }
}
