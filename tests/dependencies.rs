//! Dependency graph over solutions on disk

mod common;

use common::*;
use solution_metrics::{analyze, AnalysisConfig};

fn relations_of(fixture: &TestSolution) -> Vec<(String, String)> {
    let report = analyze(&fixture.load(), &AnalysisConfig::default()).unwrap();
    edges(&report)
        .into_iter()
        .map(|(s, t)| (s.to_string(), t.to_string()))
        .collect()
}

fn pair(source: &str, target: &str) -> (String, String) {
    (source.to_string(), target.to_string())
}

#[test]
fn test_same_namespace_field() {
    let fixture = TestSolution::new("App")
        .with_project("App")
        .with_file("App", "Foo.cs", "namespace A\n{\n    class Foo\n    {\n        B b;\n    }\n}\n")
        .with_file("App", "B.cs", "namespace A\n{\n    class B { }\n}\n");

    assert_eq!(relations_of(&fixture), vec![pair("A.Foo", "A.B")]);
}

#[test]
fn test_other_namespace_needs_using() {
    let fixture = TestSolution::new("App")
        .with_project("App")
        .with_file("App", "Foo.cs", "namespace A\n{\n    class Foo\n    {\n        B b;\n    }\n}\n")
        .with_file("App", "B.cs", "namespace C\n{\n    class B { }\n}\n");

    assert!(relations_of(&fixture).is_empty());
}

#[test]
fn test_file_scoped_namespaces_and_aliases() {
    let fixture = TestSolution::new("App")
        .with_project("App")
        .with_file(
            "App",
            "Services/Billing.cs",
            r#"using Store = Data.Storage.InvoiceStore;
using Data.Models;

namespace Services;

public class Billing
{
    private readonly Store store;

    public Invoice[] Pending(Customer? customer)
    {
        return store.Load(customer);
    }
}
"#,
        )
        .with_file(
            "App",
            "Data/Models.cs",
            "namespace Data.Models;\n\npublic record Invoice(int Id);\npublic class Customer { }\n",
        )
        .with_file(
            "App",
            "Data/InvoiceStore.cs",
            "namespace Data.Storage;\n\npublic class InvoiceStore { }\n",
        );

    assert_eq!(
        relations_of(&fixture),
        vec![
            pair("Services.Billing", "Data.Models.Customer"),
            pair("Services.Billing", "Data.Models.Invoice"),
            pair("Services.Billing", "Data.Storage.InvoiceStore"),
        ]
    );
}

#[test]
fn test_relations_span_projects() {
    let fixture = TestSolution::new("Suite")
        .with_project("Domain")
        .with_project("Api")
        .with_file("Domain", "Entity.cs", "namespace Suite.Domain\n{\n    public abstract class Entity { }\n}\n")
        .with_file(
            "Domain",
            "Product.cs",
            "namespace Suite.Domain\n{\n    public class Product : Entity { }\n}\n",
        )
        .with_file(
            "Api",
            "Catalog.cs",
            "using System.Collections.Generic;\nusing Suite.Domain;\n\nnamespace Suite.Api\n{\n    public class Catalog\n    {\n        private Dictionary<int, List<Product>> byCategory = new Dictionary<int, List<Product>>();\n    }\n}\n",
        );

    assert_eq!(
        relations_of(&fixture),
        vec![
            pair("Suite.Api.Catalog", "Suite.Domain.Product"),
            pair("Suite.Domain.Product", "Suite.Domain.Entity"),
        ]
    );
}
