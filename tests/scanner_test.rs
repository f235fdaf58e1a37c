use order_extract::*;

const NAME_STYLE: &str = "font-family:Helvetica;font-size:12px;font-weight:700;letter-spacing:0.25;line-height:18px;text-align:left;color:#0A0A0A;";
const ITEM_ID_STYLE: &str = "font-family:Helvetica;font-size:12px;font-weight:400;letter-spacing:0.25;line-height:18px;text-align:left;color:#000000;";
const QUANTITY_STYLE: &str = "font-family:Helvetica;font-size:12px;font-weight:400;letter-spacing:0.25;line-height:18px;text-align:center;color:#4D4D4D;";

fn scan_html(html: &str) -> PerMessageScan {
    scan(Tokenizer::new(html), &Template::sephora())
}

fn text(s: &str) -> Token {
    Token::Text(s.to_string())
}

fn start(name: &str) -> Token {
    Token::StartTag(Tag {
        name: name.to_string(),
        attrs: vec![],
        self_closing: false,
    })
}

fn styled_div(style: &str) -> Token {
    Token::StartTag(Tag {
        name: "div".to_string(),
        attrs: vec![Attribute {
            key: "style".to_string(),
            value: style.to_string(),
        }],
        self_closing: false,
    })
}

#[test]
fn test_no_markers_yields_empty_scan() {
    let result = scan_html("<html><body><p>Hello</p><div style=\"color:red\">x</div></body></html>");
    assert!(result.is_empty());
    assert!(!result.truncated);
    assert_eq!(result.item_count(), Some(0));
}

#[test]
fn test_tracking_value_two_tokens_after_sentinel() {
    let tokens = vec![
        text("TRACKING #:"),
        start("br"),
        text("1Z999AA10123456784"),
    ];
    let result = scan(tokens, &Template::sephora());
    assert_eq!(result.tracking_id, "1Z999AA10123456784");
}

#[test]
fn test_tracking_offset_is_positional() {
    // A whitespace node between label and value lands the capture on it
    let result = scan_html("<span>TRACKING #:</span> <span>1Z999AA10123456784</span>");
    assert_eq!(result.tracking_id, " ");
}

#[test]
fn test_last_tracking_sentinel_wins() {
    let result = scan_html("<p>TRACKING #:<br>FIRST</p><p>TRACKING #:<br>SECOND</p>");
    assert_eq!(result.tracking_id, "SECOND");
}

#[test]
fn test_ship_to_skips_empty_text() {
    let tokens = vec![
        text("SHIP TO:"),
        text(""),
        text("123 Main St"),
        text("  "),
        text("Springfield, IL"),
    ];
    let result = scan(tokens, &Template::sephora());
    assert_eq!(result.ship_to, "123 Main St\nSpringfield, IL");
}

#[test]
fn test_ship_to_trims_lines_across_markup() {
    let result = scan_html(
        "<b> SHIP TO: </b>\n<span>  123 Main St  </span><br>\n<span>Springfield, IL\n</span>",
    );
    assert_eq!(result.ship_to, "123 Main St\nSpringfield, IL");
}

#[test]
fn test_item_id_prefix_stripped_and_trimmed() {
    let html = format!(r#"<div style="{ITEM_ID_STYLE}">ITEM 4502199 </div>"#);
    assert_eq!(scan_html(&html).item_ids, vec!["4502199"]);
}

#[test]
fn test_name_and_quantity_kept_raw() {
    let html = format!(
        r#"<div style="{NAME_STYLE}"> Ultra Repair Cream </div><div style="{QUANTITY_STYLE}">2 </div>"#
    );
    let result = scan_html(&html);
    assert_eq!(result.item_names, vec![" Ultra Repair Cream "]);
    assert_eq!(result.item_quantities, vec!["2 "]);
}

#[test]
fn test_one_capture_per_tag() {
    let tokens = vec![
        Token::StartTag(Tag {
            name: "div".into(),
            attrs: vec![
                Attribute {
                    key: "style".into(),
                    value: ITEM_ID_STYLE.into(),
                },
                Attribute {
                    key: "style".into(),
                    value: NAME_STYLE.into(),
                },
            ],
            self_closing: false,
        }),
        text("ITEM 77"),
        text("Not a name"),
    ];
    let result = scan(tokens, &Template::sephora());
    assert_eq!(result.item_ids, vec!["77"]);
    assert!(result.item_names.is_empty());
}

#[test]
fn test_other_containers_ignored() {
    let html = format!(
        r#"<span style="{NAME_STYLE}">Cream</span><div style="{NAME_STYLE}"/>Balm"#
    );
    assert!(scan_html(&html).item_names.is_empty());
}

#[test]
fn test_landing_on_tag_captures_empty_value() {
    let html = format!(r#"<div style="{NAME_STYLE}"><b>Cream</b></div>"#);
    assert_eq!(scan_html(&html).item_names, vec![""]);
}

#[test]
fn test_skipped_tokens_are_not_markers() {
    // The token right after the sentinel is consumed by the lookahead
    let tokens = vec![
        text("TRACKING #:"),
        text("SHIP TO:"),
        text("1Z1"),
        text("Elsewhere"),
    ];
    let result = scan(tokens, &Template::sephora());
    assert_eq!(result.tracking_id, "1Z1");
    assert!(result.ship_to.is_empty());
}

#[test]
fn test_end_of_stream_mid_capture_finds_nothing() {
    let html = format!(r#"<div style="{ITEM_ID_STYLE}">"#);
    assert!(scan_html(&html).item_ids.is_empty());

    assert!(scan_html("<p>TRACKING #:<br>").tracking_id.is_empty());
    assert!(scan_html("<p>SHIP TO:</p><p>123 Main St</p>").ship_to.is_empty());
}

#[test]
fn test_step_counts_down_lookahead() {
    let template = Template::sephora();
    let scanner = Scanner::new(&template);
    let mut result = PerMessageScan::default();

    let state = scanner.step(ScanState::Seeking, &text("TRACKING #:"), &mut result);
    assert_eq!(
        state,
        ScanState::Capture {
            target: CaptureTarget::Tracking,
            remaining: TRACKING_LOOKAHEAD,
        }
    );

    let state = scanner.step(state, &start("br"), &mut result);
    assert_eq!(
        state,
        ScanState::Capture {
            target: CaptureTarget::Tracking,
            remaining: 1,
        }
    );

    let state = scanner.step(state, &text("1Z"), &mut result);
    assert_eq!(state, ScanState::Seeking);
    assert_eq!(result.tracking_id, "1Z");
}

#[test]
fn test_fingerprint_enters_item_capture() {
    let template = Template::sephora();
    let scanner = Scanner::new(&template);
    let mut result = PerMessageScan::default();

    let state = scanner.step(ScanState::Seeking, &styled_div(QUANTITY_STYLE), &mut result);
    assert_eq!(
        state,
        ScanState::Capture {
            target: CaptureTarget::Item(ItemField::Quantity),
            remaining: FINGERPRINT_LOOKAHEAD,
        }
    );
}

#[test]
fn test_token_budget_truncates() {
    let template = Template::sephora();
    let html = include_str!("fixtures/sephora_order.html");

    let result = Scanner::new(&template)
        .with_max_tokens(3)
        .scan(Tokenizer::new(html));
    assert!(result.truncated);
    assert_eq!(result.tokens_seen, 3);
}

#[test]
fn test_budget_equal_to_stream_is_not_truncated() {
    let template = Template::sephora();
    let result = Scanner::new(&template)
        .with_max_tokens(3)
        .scan(Tokenizer::new("<p>a</p>"));
    assert!(!result.truncated);
    assert_eq!(result.tokens_seen, 3);
}

#[test]
fn test_fixture_order() {
    let result = scan_html(include_str!("fixtures/sephora_order.html"));

    assert_eq!(result.item_ids, vec!["4502199", "2219640"]);
    assert_eq!(
        result.item_names,
        vec!["Ultra Repair Cream", "Lip Sleeping Mask & Balm"]
    );
    assert_eq!(result.item_quantities, vec!["1", "2"]);
    assert_eq!(result.tracking_id, "1Z999AA10123456784");
    assert_eq!(result.ship_to, "123 Main St\nSpringfield, IL");
    assert!(!result.truncated);
}

#[test]
fn test_scan_is_repeatable() {
    let html = include_str!("fixtures/sephora_order.html");
    let first = scan(Tokenizer::from_bytes(html.as_bytes()), &Template::sephora());
    let second = scan(Tokenizer::from_bytes(html.as_bytes()), &Template::sephora());
    assert_eq!(first, second);
}

#[test]
fn test_misaligned_fixture_keeps_raw_counts() {
    let result = scan_html(include_str!("fixtures/misaligned_order.html"));
    assert_eq!(result.item_ids.len(), 2);
    assert_eq!(result.item_names.len(), 1);
    assert_eq!(result.item_quantities.len(), 2);
    assert_eq!(result.item_count(), None);
}

#[test]
fn test_name_with_named_references() {
    let html = format!(
        r#"<div style="{NAME_STYLE}">Cr&egrave;me de la Mer &eacute;clat &frac12; oz</div>"#
    );
    assert_eq!(scan_html(&html).item_names, vec!["Crème de la Mer éclat ½ oz"]);
}

#[test]
fn test_crlf_body_captures_lf() {
    let html = format!("<div style=\"{NAME_STYLE}\">Cream\r\n</div>");
    assert_eq!(scan_html(&html).item_names, vec!["Cream\n"]);
}

#[test]
fn test_crlf_fixture_matches_lf_fixture() {
    let crlf = scan_html(include_str!("fixtures/sephora_order_crlf.html"));
    let lf = scan_html(include_str!("fixtures/sephora_order.html"));
    assert_eq!(crlf, lf);
    assert_eq!(crlf.ship_to, "123 Main St\nSpringfield, IL");
}

#[test]
fn test_empty_comment_does_not_hide_sentinel() {
    let result = scan_html("<!-->TRACKING #:<br>1Z<!-- x -->");
    assert_eq!(result.tracking_id, "1Z");
}

#[test]
fn test_fingerprint_inside_noscript_ignored() {
    let html = format!(r#"<noscript><div style="{NAME_STYLE}">Cream</div></noscript>"#);
    assert!(scan_html(&html).item_names.is_empty());
}
