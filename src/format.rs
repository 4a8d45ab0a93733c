//! Turns a lightly marked-up LLM reply into an HTML fragment

use std::ops::Range;

/// Escape, apply `**strong**` and `*em*`, then wrap paragraphs.
pub fn format_reply(raw: &str) -> String
{   let escaped = escape_html(raw.trim());
    let marked = apply_emphasis(&escaped);
    wrap_paragraphs(&marked)
}

pub fn escape_html(text: &str) -> String
{   let mut out = String::with_capacity(text.len());
    for c in text.chars()
    {   match c
        {   '&' => out.push_str("&amp;")
          , '<' => out.push_str("&lt;")
          , '>' => out.push_str("&gt;")
          , '"' => out.push_str("&quot;")
          , '\'' => out.push_str("&#39;")
          , c => out.push(c)
        }
    }
    out
}

fn apply_emphasis(text: &str) -> String
{   let (marked, strong) = apply_strong(text);
    apply_italics(&marked, &strong)
}

/// `**X**` with non-empty single-line content. Returns the byte ranges
/// of the emitted strong elements.
fn apply_strong(text: &str) -> (String, Vec<Range<usize>>)
{   let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut spans = vec![];
    let mut plain_start = 0;
    let mut i = 0;

    while i + 1 < bytes.len()
    {   if bytes[i] == b'*' && bytes[i + 1] == b'*'
        {   let open = i + 2;
            if let Some(rel) = text[open..].find("**")
            {   let inner = &text[open..open + rel];
                if !inner.is_empty() && !inner.contains('\n')
                {   out.push_str(&text[plain_start..i]);
                    let start = out.len();
                    out.push_str("<strong>");
                    out.push_str(inner);
                    out.push_str("</strong>");
                    spans.push(start..out.len());
                    i = open + rel + 2;
                    plain_start = i;
                    continue;
                }
            }
        }
        i += 1;
    }

    out.push_str(&text[plain_start..]);
    (out, spans)
}

/// `*X*` where neither delimiter touches another `*`. Strong elements
/// are opaque: no delimiter is taken from inside one, so `**a*b*c**`
/// keeps its asterisks, while an italic span may enclose a strong one.
fn apply_italics(text: &str, strong: &[Range<usize>]) -> String
{   let bytes = text.as_bytes();
    let skip_to = |i: usize| {
      strong.iter().find(|span| span.contains(&i)).map(|span| span.end)
    };
    let next_star = |mut j: usize| {
      while j < bytes.len()
      {   if let Some(end) = skip_to(j)
          {   j = end;
              continue;
          }
          if bytes[j] == b'*'
          {   return Some(j);
          }
          j += 1;
      }
      None
    };

    let mut out = String::with_capacity(text.len());
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len()
    {   if let Some(end) = skip_to(i)
        {   i = end;
            continue;
        }
        let opens = bytes[i] == b'*'
          && (i == 0 || bytes[i - 1] != b'*')
          && bytes.get(i + 1).is_some_and(|&b| b != b'*');
        if opens
        {   if let Some(close) = next_star(i + 1)
            {   let inner = &text[i + 1..close];
                let detached = bytes.get(close + 1) != Some(&b'*');
                if detached && !inner.contains('\n')
                {   out.push_str(&text[plain_start..i]);
                    out.push_str("<em>");
                    out.push_str(inner);
                    out.push_str("</em>");
                    i = close + 1;
                    plain_start = i;
                    continue;
                }
            }
        }
        i += 1;
    }

    out.push_str(&text[plain_start..]);
    out
}

/// Blank lines separate paragraphs; blocks already starting with a tag
/// are kept bare.
fn wrap_paragraphs(text: &str) -> String
{   let mut paragraphs: Vec<String> = vec![];
    let mut current: Vec<&str> = vec![];

    for line in text.lines()
    {   if line.trim().is_empty()
        {   if !current.is_empty()
            {   paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else
        {   current.push(line.trim_end());
        }
    }
    if !current.is_empty()
    {   paragraphs.push(current.join("\n"));
    }

    paragraphs
      .into_iter()
      .map(|p| {
        let p = p.trim();
        if p.starts_with('<')
        {   p.to_string()
        } else
        {   format!("<p>{}</p>", p)
        }
      })
      .collect::<Vec<_>>()
      .join("\n")
}
