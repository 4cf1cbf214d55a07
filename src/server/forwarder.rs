use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

#[derive(Clone, Copy)]
enum Pipe {
    Stdout,
    Stderr,
}

/// Echoes a child's stdout and stderr as one line stream, each line prefixed.
///
/// Runs until both streams reach end-of-file. Line order within each stream is
/// preserved; lines from the two streams are emitted in arrival order. Bytes
/// that are not valid UTF-8 are replaced rather than ending the stream.
/// Returns the number of lines forwarded.
pub async fn forward_output<O, E, F>(stdout: O, stderr: E, prefix: String, mut emit: F) -> usize
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut out = BufReader::new(stdout);
    let mut err = BufReader::new(stderr);
    // read_until keeps partial data in the buffer when the other branch wins
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();
    let mut out_open = true;
    let mut err_open = true;
    let mut forwarded = 0;

    while out_open || err_open {
        let (pipe, read) = tokio::select! {
            read = out.read_until(b'\n', &mut out_buf), if out_open => (Pipe::Stdout, read),
            read = err.read_until(b'\n', &mut err_buf), if err_open => (Pipe::Stderr, read),
        };

        let (buf, open) = match pipe {
            Pipe::Stdout => (&mut out_buf, &mut out_open),
            Pipe::Stderr => (&mut err_buf, &mut err_open),
        };

        match read {
            Ok(0) => *open = false,
            Ok(_) => {
                emit(format!("{}{}", prefix, decode_line(buf)));
                buf.clear();
                forwarded += 1;
            }
            Err(e) => {
                log::debug!("Stopped forwarding server stream: {}", e);
                *open = false;
            }
        }
    }

    forwarded
}

fn decode_line(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_merges_and_prefixes_both_streams() {
        let stdout: &[u8] = b"loading weights\nlistening on 0.0.0.0:30000\n";
        let stderr: &[u8] = b"WARNING: slow tokenizer\n";
        let mut lines = Vec::new();

        let count =
            forward_output(stdout, stderr, "[SERVER] ".to_string(), |l| lines.push(l)).await;

        assert_eq!(count, 3);
        assert!(lines.contains(&"[SERVER] WARNING: slow tokenizer".to_string()));
        let out_lines: Vec<&String> = lines
            .iter()
            .filter(|l| !l.contains("WARNING"))
            .collect();
        assert_eq!(
            out_lines,
            vec!["[SERVER] loading weights", "[SERVER] listening on 0.0.0.0:30000"]
        );
    }

    #[tokio::test]
    async fn test_unterminated_last_line_and_empty_stream() {
        let stdout: &[u8] = b"no newline";
        let stderr: &[u8] = b"";
        let mut lines = Vec::new();

        let count = forward_output(stdout, stderr, ">> ".to_string(), |l| lines.push(l)).await;

        assert_eq!(count, 1);
        assert_eq!(lines, vec![">> no newline"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_does_not_stop_forwarding() {
        let stdout: &[u8] = b"ok\n\xff\xfe progress\nafter\n";
        let stderr: &[u8] = b"";
        let mut lines = Vec::new();

        let count =
            forward_output(stdout, stderr, "[SERVER] ".to_string(), |l| lines.push(l)).await;

        assert_eq!(count, 3);
        assert_eq!(lines[0], "[SERVER] ok");
        assert!(lines[1].ends_with(" progress"));
        assert!(lines[1].contains('\u{FFFD}'));
        assert_eq!(lines[2], "[SERVER] after");
    }

    #[tokio::test]
    async fn test_crlf_line_endings_trimmed() {
        let stdout: &[u8] = b"step 1/50\r\n";
        let stderr: &[u8] = b"";
        let mut lines = Vec::new();

        forward_output(stdout, stderr, String::new(), |l| lines.push(l)).await;

        assert_eq!(lines, vec!["step 1/50"]);
    }
}
