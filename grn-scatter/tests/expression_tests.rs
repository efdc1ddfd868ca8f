use grn_scatter::common_io::create_temp_dir_file;
use grn_scatter::errors::ScatterError;
use grn_scatter::expression::{extract_submatrix, read_sample_names, sample_names_in_range};
use grn_scatter::partition::ShardRange;

fn toy_exprs_file() -> anyhow::Result<std::path::PathBuf> {
    let exprs = create_temp_dir_file("exprs.tsv")?;
    std::fs::write(
        &exprs,
        "probe\tS1\tS2\tS3\tS4\tS5\n\
         g1\t1\t2\t3\t4\t5\n\
         g2\t6\t7\t8\t9\t10\n",
    )?;
    Ok(exprs)
}

#[test]
fn header_gives_ordered_sample_names() -> anyhow::Result<()> {
    let exprs = toy_exprs_file()?;
    let samples = read_sample_names(exprs.to_str().unwrap())?;
    let expected: Vec<Box<str>> = ["S1", "S2", "S3", "S4", "S5"]
        .iter()
        .map(|x| x.to_string().into_boxed_str())
        .collect();
    assert_eq!(samples, expected);
    Ok(())
}

#[test]
fn duplicate_sample_identifiers_are_rejected() -> anyhow::Result<()> {
    let exprs = create_temp_dir_file("exprs.tsv")?;
    std::fs::write(&exprs, "probe\tS1\tS2\tS1\ng1\t1\t2\t3\n")?;

    let err = read_sample_names(exprs.to_str().unwrap()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScatterError>(),
        Some(ScatterError::InvalidArgument(_))
    ));
    Ok(())
}

#[test]
fn extracts_exact_columns_of_a_middle_shard() -> anyhow::Result<()> {
    let exprs = toy_exprs_file()?;
    let out = create_temp_dir_file("sub.tsv")?;

    let range = ShardRange { start: 2, end: 4 };
    extract_submatrix(exprs.to_str().unwrap(), &range, out.to_str().unwrap())?;

    let written = std::fs::read_to_string(&out)?;
    assert_eq!(
        written,
        "probe\tS2\tS3\tS4\n\
         g1\t2\t3\t4\n\
         g2\t7\t8\t9\n"
    );
    Ok(())
}

#[test]
fn range_beyond_header_is_rejected() -> anyhow::Result<()> {
    let exprs = toy_exprs_file()?;
    let out = create_temp_dir_file("sub.tsv")?;

    let range = ShardRange { start: 4, end: 6 };
    let err =
        extract_submatrix(exprs.to_str().unwrap(), &range, out.to_str().unwrap()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScatterError>(),
        Some(ScatterError::InvalidArgument(_))
    ));

    let samples = read_sample_names(exprs.to_str().unwrap())?;
    assert!(sample_names_in_range(&samples, &range).is_err());
    Ok(())
}

#[test]
fn ragged_expression_row_is_rejected() -> anyhow::Result<()> {
    let exprs = create_temp_dir_file("exprs.tsv")?;
    std::fs::write(&exprs, "probe\tS1\tS2\tS3\ng1\t1\t2\n")?;
    let out = create_temp_dir_file("sub.tsv")?;

    let range = ShardRange { start: 1, end: 2 };
    let err =
        extract_submatrix(exprs.to_str().unwrap(), &range, out.to_str().unwrap()).unwrap_err();
    match err.downcast_ref::<ScatterError>() {
        Some(ScatterError::MalformedRecord { line, .. }) => assert_eq!(*line, 2),
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}
