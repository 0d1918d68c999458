/// Content installed on first load and on reset.
pub const DEFAULT_TEMPLATE: &str = r#"# Markdown syntax guide

## Headers

# This is a Heading h1
## This is a Heading h2
###### This is a Heading h6

## Emphasis

*This text will be italic*  
_This will also be italic_

**This text will be bold**  
__This will also be bold__

_You **can** combine them_

## Lists

### Unordered

* Item 1
* Item 2
* Item 2a
* Item 2b
    * Item 3a
    * Item 3b

### Ordered

1. Item 1
2. Item 2
3. Item 3
    1. Item 3a
    2. Item 3b

## Images

![This is an alt text.](/image/sample.webp "This is a sample image.")

## Links

You may be using [Markdown Live Preview](https://markdownlivepreview.com/).

## Blockquotes

> Markdown is a lightweight markup language with plain-text-formatting syntax, created in 2004 by John Gruber with Aaron Swartz.
>
>> Markdown is often used to format readme files, for writing messages in online discussion forums, and to create rich text using a plain text editor.

## Tables

| Left columns  | Right columns |
| ------------- |:-------------:|
| left foo      | right foo     |
| left bar      | right bar     |
| left baz      | right baz     |

## Blocks of code

```
let message = 'Hello world';
alert(message);
```

## Inline code

This preview is rendered with `comrak`.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_renders_every_section() {
        let html = mdcore::render(DEFAULT_TEMPLATE, &mdcore::RenderOptions::default()).unwrap();
        for tag in ["<h1>", "<h6>", "<em>", "<strong>", "<ul>", "<ol>", "<img", "<blockquote>", "<table>", "<pre>", "<code>"] {
            assert!(html.contains(tag), "missing {}", tag);
        }
    }

    #[test]
    fn test_template_keeps_hard_line_breaks() {
        assert!(DEFAULT_TEMPLATE.contains("*This text will be italic*  \n"));
    }
}
