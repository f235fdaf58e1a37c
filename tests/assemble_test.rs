use order_extract::*;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

fn meta() -> MessageMeta {
    MessageMeta {
        message_id: MessageId::new("183519c7be21e282"),
        recipient: "Jane Doe jane@example.com".into(),
        received: parse_received("Sat, 24 Sep 2022 10:15:00 -0700"),
        labels: vec!["sephora-arrived".into()],
    }
}

#[test]
fn test_assemble_zips_in_encounter_order() {
    let scan = PerMessageScan {
        item_ids: strings(&["4502199", "2219640"]),
        item_names: strings(&["Ultra Repair Cream", "Lip Sleeping Mask"]),
        item_quantities: strings(&["1", "2"]),
        tracking_id: "1Z999AA10123456784".into(),
        ship_to: "123 Main St\nSpringfield, IL".into(),
        ..PerMessageScan::default()
    };

    let records = assemble(scan, &meta()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].item_id, "4502199");
    assert_eq!(records[0].item_name, "Ultra Repair Cream");
    assert_eq!(records[0].item_quantity, "1");
    assert_eq!(records[1].item_id, "2219640");
    assert_eq!(records[1].item_name, "Lip Sleeping Mask");
    assert_eq!(records[1].item_quantity, "2");

    for record in &records {
        assert_eq!(record.tracking_id, "1Z999AA10123456784");
        assert_eq!(record.ship_to, "123 Main St\nSpringfield, IL");
        assert_eq!(record.received, meta().received);
        assert_eq!(record.message_id.as_str(), "183519c7be21e282");
        assert_eq!(record.recipient, "Jane Doe jane@example.com");
    }
}

#[test]
fn test_assemble_rejects_misaligned_counts() {
    let scan = PerMessageScan {
        item_ids: strings(&["1", "2", "3"]),
        item_names: strings(&["a", "b"]),
        item_quantities: strings(&["1", "1", "1"]),
        ..PerMessageScan::default()
    };

    let err = assemble(scan, &meta()).unwrap_err();

    match &err {
        ExtractError::MisalignedItems {
            message_id,
            item_ids,
            item_names,
            item_quantities,
        } => {
            assert_eq!(message_id, "183519c7be21e282");
            assert_eq!(*item_ids, 3);
            assert_eq!(*item_names, 2);
            assert_eq!(*item_quantities, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.message_id(), Some("183519c7be21e282"));
}

#[test]
fn test_assemble_names_without_ids_is_misaligned() {
    let scan = PerMessageScan {
        item_names: strings(&["orphan"]),
        ..PerMessageScan::default()
    };
    assert!(assemble(scan, &meta()).is_err());
}

#[test]
fn test_assemble_no_items() {
    let scan = PerMessageScan {
        tracking_id: "1Z".into(),
        ..PerMessageScan::default()
    };
    assert!(assemble(scan, &meta()).unwrap().is_empty());
}

#[test]
fn test_missing_scalars_become_empty_strings() {
    let scan = PerMessageScan {
        item_ids: strings(&["1"]),
        item_names: strings(&["a"]),
        item_quantities: strings(&["1"]),
        ..PerMessageScan::default()
    };

    let records = assemble(scan, &MessageMeta::new("m")).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tracking_id, "");
    assert_eq!(records[0].ship_to, "");
    assert_eq!(records[0].recipient, "");
    assert!(records[0].received.is_none());
}
