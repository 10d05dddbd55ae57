use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod decompress {
    use divan::Bencher;

    fn get_input() -> Vec<u8> {
        // literal groups followed by long runs exercise both code paths
        let mut stream = b"Yaz0".to_vec();
        let mut body = Vec::new();
        let mut size = 0u32;
        for i in 0..4096u32 {
            body.extend_from_slice(&[0xC0, i as u8, (i >> 8) as u8]);
            for _ in 0..6 {
                body.extend_from_slice(&[0x00, 0x01, 0xFF]);
            }
            size += 2 + 6 * (0xFF + 0x12);
        }
        stream.extend_from_slice(&size.to_be_bytes());
        stream.extend_from_slice(&[0; 8]);
        stream.extend_from_slice(&body);
        stream
    }

    #[divan::bench]
    fn decompress(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(ead_yaz0::decompress(data).unwrap());
        });
    }

    #[divan::bench]
    fn decompress_into(bencher: Bencher) {
        bencher
            .with_inputs(|| {
                let input = get_input();
                let header = ead_yaz0::Yaz0Header::parse(&input).unwrap();
                (input, vec![0u8; header.uncompressed_size as usize])
            })
            .bench_refs(|(data, output)| {
                ead_yaz0::decompress_into(data, output).unwrap();
            });
    }
}
