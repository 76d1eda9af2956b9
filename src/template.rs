//! Default scaffolding for a TypeScript project
//!
//! Pure data: the documents and lines the base project starts from. None of
//! it has semantics of its own. The engine treats script strings, lint rule
//! names and dependency versions as opaque values.

use serde_json::{json, Value as JsonValue};

use crate::dependencies::DependencySpec;

pub const MANIFEST_PATH: &str = "package.json";
pub const TSCONFIG_PATH: &str = "tsconfig.json";
pub const ESLINT_PATH: &str = ".eslintrc.json";
pub const WORKFLOW_PATH: &str = ".github/workflows/build.yml";
pub const GITIGNORE_PATH: &str = ".gitignore";

/// Settings that shape the default file set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOptions {
    pub name: String,
    pub description: String,
    pub version: String,
    pub license: String,
    /// Generate `tsconfig.json` and the TypeScript toolchain dependencies
    pub typescript: bool,
    /// Generate `.eslintrc.json` and the lint dependencies
    pub eslint: bool,
    /// Generate the CI workflow
    pub github: bool,
    /// Node.js version used by the CI workflow
    pub node_version: String,
}

impl ProjectOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            name: "project".to_string(),
            description: String::new(),
            version: "0.0.0".to_string(),
            license: "Apache-2.0".to_string(),
            typescript: true,
            eslint: true,
            github: true,
            node_version: "18.x".to_string(),
        }
    }
}

/// The package manifest, with empty dependency blocks.
pub fn package_manifest(options: &ProjectOptions) -> JsonValue {
    let mut scripts = serde_json::Map::new();
    if options.typescript {
        scripts.insert("build".into(), json!("tsc --build"));
        scripts.insert("watch".into(), json!("tsc --build -w"));
    }
    scripts.insert("test".into(), json!("jest --passWithNoTests"));
    if options.eslint {
        scripts.insert("eslint".into(), json!("eslint --ext .ts,.tsx --fix src test"));
    }

    let mut manifest = json!({
        "name": options.name,
        "description": options.description,
        "version": options.version,
        "license": options.license,
    });
    if options.typescript {
        manifest["main"] = json!("lib/index.js");
        manifest["types"] = json!("lib/index.d.ts");
    }
    manifest["scripts"] = JsonValue::Object(scripts);
    manifest["dependencies"] = json!({});
    manifest["devDependencies"] = json!({});
    manifest["peerDependencies"] = json!({});
    manifest
}

/// Development dependencies every generated project starts with.
pub fn base_dev_dependencies(options: &ProjectOptions) -> Vec<DependencySpec> {
    let mut deps = vec![
        DependencySpec::new("jest", "^29"),
        DependencySpec::new("@types/jest", "^29"),
    ];
    if options.typescript {
        deps.push(DependencySpec::new("typescript", "^4.9"));
        deps.push(DependencySpec::new("ts-jest", "^29"));
        deps.push(DependencySpec::new("@types/node", "^18"));
    }
    if options.eslint {
        deps.push(DependencySpec::new("eslint", "^8"));
        deps.push(DependencySpec::new("@typescript-eslint/parser", "^5"));
        deps.push(DependencySpec::new("@typescript-eslint/eslint-plugin", "^5"));
    }
    deps
}

pub fn tsconfig() -> JsonValue {
    json!({
        "compilerOptions": {
            "rootDir": "src",
            "outDir": "lib",
            "declaration": true,
            "esModuleInterop": true,
            "lib": ["es2020"],
            "module": "CommonJS",
            "noImplicitAny": true,
            "noImplicitReturns": true,
            "noUnusedLocals": true,
            "strict": true,
            "target": "ES2020"
        },
        "include": ["src/**/*.ts"],
        "exclude": ["node_modules"]
    })
}

pub fn eslintrc() -> JsonValue {
    json!({
        "env": {"jest": true, "node": true},
        "root": true,
        "plugins": ["@typescript-eslint"],
        "parser": "@typescript-eslint/parser",
        "parserOptions": {
            "ecmaVersion": 2018,
            "sourceType": "module",
            "project": "./tsconfig.json"
        },
        "extends": ["plugin:@typescript-eslint/recommended"],
        "ignorePatterns": ["*.js", "*.d.ts", "node_modules/"],
        "rules": {
            "indent": ["off"],
            "quotes": ["error", "single", {"avoidEscape": true}],
            "comma-dangle": ["error", "always-multiline"],
            "no-shadow": ["off"],
            "@typescript-eslint/no-shadow": ["error"]
        }
    })
}

/// CI workflow: checkout, set up node, install, build.
pub fn build_workflow(options: &ProjectOptions) -> JsonValue {
    let mut steps = vec![
        json!({"name": "Checkout", "uses": "actions/checkout@v3"}),
        json!({
            "name": "Setup Node.js",
            "uses": "actions/setup-node@v3",
            "with": {"node-version": options.node_version}
        }),
        json!({"name": "Install dependencies", "run": "npm ci"}),
    ];
    if options.typescript {
        steps.push(json!({"name": "Build", "run": "npm run build"}));
    }
    steps.push(json!({"name": "Test", "run": "npm test"}));

    json!({
        "name": "build",
        "on": {"pull_request": {}, "workflow_dispatch": {}},
        "jobs": {
            "build": {
                "runs-on": "ubuntu-latest",
                "permissions": {"contents": "read"},
                "steps": steps
            }
        }
    })
}

pub fn gitignore_lines(options: &ProjectOptions) -> Vec<String> {
    let mut lines = vec!["node_modules/", "coverage/", "*.log"];
    if options.typescript {
        lines.push("lib/");
        lines.push("*.tsbuildinfo");
    }
    lines.into_iter().map(String::from).collect()
}
