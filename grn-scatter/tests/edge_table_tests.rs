use grn_scatter::common_io::create_temp_dir_file;
use grn_scatter::edge_table::EdgeScoreTable;
use grn_scatter::errors::ScatterError;

#[test]
fn parses_a_labeled_shard_table() -> anyhow::Result<()> {
    let table_file = create_temp_dir_file("shard.tsv")?;
    std::fs::write(
        &table_file,
        "tf\tgene\tS1\tS2\n\
         t1\tg1\t0.5\t1.5\n\
         t1\tg2\t-1\t0\n\
         t2\tg1\t2\t3\n\
         t2\tg2\t4\t5\n",
    )?;

    let table = EdgeScoreTable::from_tsv(table_file.to_str().unwrap())?;
    assert_eq!(table.num_edges(), 4);
    assert_eq!(table.num_samples(), 2);
    assert_eq!(table.tfs[2].as_ref(), "t2");
    assert_eq!(table.genes[2].as_ref(), "g1");
    assert_eq!(table.scores[(0, 1)], 1.5);
    assert_eq!(table.scores[(3, 0)], 4.0);
    Ok(())
}

#[test]
fn short_row_reports_its_line_number() -> anyhow::Result<()> {
    let table_file = create_temp_dir_file("shard.tsv")?;
    std::fs::write(
        &table_file,
        "tf\tgene\tS1\tS2\n\
         t1\tg1\t0.5\t1.5\n\
         t1\tg2\t-1\n",
    )?;

    let err = EdgeScoreTable::from_tsv(table_file.to_str().unwrap()).unwrap_err();
    match err.downcast_ref::<ScatterError>() {
        Some(ScatterError::MalformedRecord { line, .. }) => assert_eq!(*line, 3),
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[test]
fn non_numeric_score_is_rejected() -> anyhow::Result<()> {
    let table_file = create_temp_dir_file("shard.tsv")?;
    std::fs::write(
        &table_file,
        "tf\tgene\tS1\n\
         t1\tg1\tNaNope\n",
    )?;

    let err = EdgeScoreTable::from_tsv(table_file.to_str().unwrap()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScatterError>(),
        Some(ScatterError::MalformedRecord { .. })
    ));
    Ok(())
}

#[test]
fn wrong_header_is_rejected() -> anyhow::Result<()> {
    let table_file = create_temp_dir_file("shard.tsv")?;
    std::fs::write(&table_file, "gene\ttf\tS1\nt1\tg1\t0.5\n")?;

    let err = EdgeScoreTable::from_tsv(table_file.to_str().unwrap()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScatterError>(),
        Some(ScatterError::MalformedRecord { line: 1, .. })
    ));
    Ok(())
}

#[test]
fn absent_file_is_missing_input() {
    let err = EdgeScoreTable::from_tsv("/no/such/shard_output.tsv").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScatterError>(),
        Some(ScatterError::MissingInput(_))
    ));
}

#[test]
fn relabeling_checks_the_sample_count() -> anyhow::Result<()> {
    let table_file = create_temp_dir_file("shard.tsv")?;
    std::fs::write(
        &table_file,
        "tf\tgene\tscore_0\tscore_1\n\
         t1\tg1\t0.5\t1.5\n",
    )?;

    let mut table = EdgeScoreTable::from_tsv(table_file.to_str().unwrap())?;

    let wrong: Vec<Box<str>> = vec!["S1".into()];
    let err = table.relabel_samples(wrong).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScatterError>(),
        Some(ScatterError::InvalidArgument(_))
    ));

    table.relabel_samples(vec!["S1".into(), "S2".into()])?;
    assert_eq!(table.samples[1].as_ref(), "S2");
    Ok(())
}
