use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jsxlab_parser::{parse, parse_with_imports, ImportSpec, KnownImports};

fn parse_simple_component(c: &mut Criterion) {
    let source = r#"<div className="container"><h1>Hello</h1></div>"#;

    c.bench_function("parse_simple_component", |b| {
        b.iter(|| parse(black_box(source)))
    });
}

fn parse_page_component(c: &mut Criterion) {
    let source = r#"
export default function Landing() {
  const navigate = useNavigate();
  return (
    <main className="min-h-screen">
      <section className="hero" style={{ paddingTop: 96, background: '#fafafa' }}>
        <motion.h1 className="text-6xl">New arrivals</motion.h1>
        <p className="lead">Handpicked for the season.</p>
        <Button onClick={() => navigate('/shop')}>Shop</Button>
      </section>
      <ul className="grid grid-cols-3 gap-6">
        <li><img src="/a.jpg" width={320} height={240} alt="A" /><span>$12</span></li>
        <li><img src="/b.jpg" width={320} height={240} alt="B" /><span>$18</span></li>
        <li><img src="/c.jpg" width={320} height={240} alt="C" /><span>$24</span></li>
      </ul>
    </main>
  );
}
"#;
    let imports = KnownImports::new().with("Button", ImportSpec::named("@/components/ui/button"));

    c.bench_function("parse_page_component", |b| {
        b.iter(|| parse_with_imports(black_box(source), &imports))
    });
}

fn parse_wide_list(c: &mut Criterion) {
    let mut source = String::from("<ul>");
    for i in 0..500 {
        source.push_str(&format!(
            "<li className=\"row\" data-index={{{}}}><a href=\"/p/{}\">Product {}</a></li>",
            i, i, i
        ));
    }
    source.push_str("</ul>");

    c.bench_function("parse_wide_list", |b| b.iter(|| parse(black_box(&source))));
}

criterion_group!(
    benches,
    parse_simple_component,
    parse_page_component,
    parse_wide_list
);
criterion_main!(benches);
