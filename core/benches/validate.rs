use bitschema_core::{
    DataType, FieldSpec, FragmentSpec, RecordSpec, SchemaRoot, ValidationMode, ViewSpec,
};
use criterion::{Criterion, criterion_group, criterion_main};

fn gen_schema(records: usize, fields_per_record: usize) -> SchemaRoot {
    let record_bits = (fields_per_record * 16) as u32;
    let mut schema = SchemaRoot::new("Bench", "generated");
    let view = schema
        .add_view(ViewSpec::new("View", record_bits * records as u32))
        .unwrap();

    for r in 0..records {
        let record = schema
            .add_record(view, RecordSpec::new(format!("r{}", r), record_bits))
            .unwrap();
        for f in 0..fields_per_record {
            let field = FieldSpec::new(format!("f{}", f), DataType::BitArray, 16)
                .with_fragment(FragmentSpec::new(0, 4))
                .with_fragment(FragmentSpec::new(8, 8));
            schema.add_field(record, field).unwrap();
        }
    }

    schema
}

fn bench_validate(c: &mut Criterion) {
    for &(records, fields) in &[(1usize, 10usize), (10, 50), (50, 100)] {
        let schema = gen_schema(records, fields);

        c.bench_function(&format!("validate_{}x{}", records, fields), |b| {
            b.iter(|| {
                let errors = schema.validate_all();
                assert!(errors.is_empty());
            })
        });

        c.bench_function(&format!("finish_{}x{}", records, fields), |b| {
            b.iter(|| {
                let _ = schema.clone().finish(ValidationMode::FailFast).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_validate);
criterion_main!(benches);
